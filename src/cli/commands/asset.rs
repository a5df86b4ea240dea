//! Image mapping and storage commands.

use console::style;

use super::helpers::{bucket_or_default, open_context, parse_language};
use crate::config::Settings;
use crate::content::{cleanup_orphans, AssetResolver};
use crate::storage::LocalBlobStore;

/// Print the resolved alt text of an image.
pub async fn cmd_alt_text(
    settings: &Settings,
    url: &str,
    lang: &str,
    bucket: Option<&str>,
) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let ctx = open_context(settings).await?;
    let resolver = AssetResolver::new(ctx.file_mappings());

    let alt = resolver
        .load_alt_text(url, bucket_or_default(settings, bucket), language)
        .await;
    if alt.is_empty() {
        println!("{} No alt text for {} ({})", style("!").yellow(), url, language);
    } else {
        println!("{}", alt);
    }
    Ok(())
}

/// Add or remove a segment reference on an image.
pub async fn cmd_link(
    settings: &Settings,
    url: &str,
    segment_id: i32,
    bucket: Option<&str>,
    link: bool,
) -> anyhow::Result<()> {
    let ctx = open_context(settings).await?;
    let resolver = AssetResolver::new(ctx.file_mappings());
    let bucket = bucket_or_default(settings, bucket);

    if link {
        let mapping = resolver.update_segment_mapping(url, segment_id, bucket).await?;
        println!(
            "{} {} is used by segments [{}]",
            style("✓").green(),
            mapping.file_path,
            mapping.segment_ids.join(", ")
        );
    } else if resolver
        .remove_segment_reference(url, segment_id, bucket)
        .await?
    {
        println!(
            "{} Unlinked segment {} from {}",
            style("✓").green(),
            segment_id,
            url
        );
    } else {
        println!(
            "{} Segment {} was not linked to {}",
            style("!").yellow(),
            segment_id,
            url
        );
    }
    Ok(())
}

/// Set alt text for one language.
pub async fn cmd_set_alt(
    settings: &Settings,
    url: &str,
    text: &str,
    lang: &str,
    bucket: Option<&str>,
) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let ctx = open_context(settings).await?;
    let mapping = AssetResolver::new(ctx.file_mappings())
        .set_alt_text(url, bucket_or_default(settings, bucket), language, text)
        .await?;

    println!(
        "{} Set {} alt text for {}",
        style("✓").green(),
        language,
        mapping.file_path
    );
    Ok(())
}

/// Report and optionally delete orphaned images.
pub async fn cmd_cleanup(
    settings: &Settings,
    bucket: Option<&str>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let ctx = open_context(settings).await?;
    let store = LocalBlobStore::new(settings.storage_dir.clone(), &settings.public_base_url);
    let bucket = bucket_or_default(settings, bucket);

    let report = cleanup_orphans(&ctx, &store, bucket, dry_run).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Scanned {} files in {}",
        style("→").cyan(),
        report.scanned,
        report.bucket
    );
    for path in &report.orphans {
        println!("  {} {}", style("orphan").yellow(), path);
    }
    if dry_run {
        println!(
            "{} {} orphaned files (dry run, nothing deleted)",
            style("!").yellow(),
            report.orphans.len()
        );
    } else {
        println!(
            "{} Deleted {} of {} orphaned files",
            style("✓").green(),
            report.deleted,
            report.orphans.len()
        );
    }
    Ok(())
}
