//! Segment registry commands.

use console::style;
use serde_json::Value;

use super::helpers::{open_context, parse_language};
use crate::config::Settings;
use crate::content::{normalize_slug, PageEditor, SegmentRegistry};

/// Add a segment to a page.
pub async fn cmd_add(
    settings: &Settings,
    page: &str,
    segment_type: &str,
    data: &str,
    lang: &str,
) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let page = normalize_slug(page);
    let data: Value = serde_json::from_str(data)
        .map_err(|e| anyhow::anyhow!("Segment data is not valid JSON: {}", e))?;
    let ctx = open_context(settings).await?;

    let segment = PageEditor::new(&ctx)
        .add_segment(&page, language, segment_type, data)
        .await?;

    println!(
        "{} Added {} segment {} to {} ({})",
        style("✓").green(),
        segment.segment_type,
        segment.id,
        page,
        language
    );
    Ok(())
}

/// Soft-delete a registry entry. The page blobs are left untouched.
pub async fn cmd_delete(settings: &Settings, segment_id: i32) -> anyhow::Result<()> {
    let ctx = open_context(settings).await?;
    let registry = SegmentRegistry::new(ctx.registry());

    if registry.soft_delete(segment_id).await? {
        println!(
            "{} Marked segment {} as deleted",
            style("✓").green(),
            segment_id
        );
    } else {
        println!(
            "{} Segment {} is unknown or already deleted",
            style("!").yellow(),
            segment_id
        );
    }
    Ok(())
}

/// List registry entries of a page.
pub async fn cmd_list(settings: &Settings, page: &str, all: bool) -> anyhow::Result<()> {
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;
    let entries = SegmentRegistry::new(ctx.registry()).entries(&page).await?;
    let entries: Vec<_> = entries.into_iter().filter(|e| all || !e.deleted).collect();

    if entries.is_empty() {
        println!("{} No segments registered for {}", style("!").yellow(), page);
        return Ok(());
    }

    println!("{}", style(format!("Segments of {}", page)).bold());
    println!("{}", "-".repeat(60));
    println!("{:<6} {:<16} {:<22} {}", "ID", "TYPE", "KEY", "STATE");
    for entry in entries {
        let state = if entry.deleted {
            style("deleted").red().to_string()
        } else if entry.is_static {
            style("static").cyan().to_string()
        } else {
            style("live").green().to_string()
        };
        println!(
            "{:<6} {:<16} {:<22} {}",
            entry.segment_id, entry.segment_type, entry.segment_key, state
        );
    }
    Ok(())
}
