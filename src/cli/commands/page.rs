//! Page commands.

use console::style;

use super::helpers::{open_context, parse_language};
use crate::config::Settings;
use crate::content::{normalize_slug, AssetResolver, PageAssembler, PageEditor};
use crate::models::ContentType;
use crate::render::Renderer;

/// Print a page's assembled segments as JSON, or as rendered HTML.
pub async fn cmd_show(settings: &Settings, page: &str, lang: &str, html: bool) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;

    let segments = PageAssembler::new(ctx.pages())
        .assemble(&page, language)
        .await?;

    if html {
        let renderer = Renderer::new(
            AssetResolver::new(ctx.file_mappings()),
            &settings.default_bucket,
        );
        let rendered = renderer.render_page(&segments, language).await;
        if !rendered.head_html.is_empty() {
            println!("{}", rendered.head_html);
        }
        print!("{}", rendered.body_html);
    } else if segments.is_empty() {
        println!(
            "{} Page {} has no visible segments in {}",
            style("!").yellow(),
            page,
            language
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&segments)?);
    }

    Ok(())
}

/// Store a raw content row.
pub async fn cmd_set(
    settings: &Settings,
    page: &str,
    key: &str,
    value: &str,
    lang: &str,
    json: bool,
) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;
    let content_type = if json {
        ContentType::Json
    } else {
        ContentType::Text
    };

    PageEditor::new(&ctx)
        .set_content(&page, key, language, content_type, value)
        .await?;

    println!(
        "{} Set {}/{} ({}, {})",
        style("✓").green(),
        page,
        key,
        language,
        content_type.as_str()
    );
    Ok(())
}

/// Hide or show a segment in one language.
pub async fn cmd_visibility(
    settings: &Settings,
    page: &str,
    segment_id: i32,
    lang: &str,
    visible: bool,
) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;
    let editor = PageEditor::new(&ctx);

    let changed = if visible {
        editor.show_segment(&page, language, segment_id).await?
    } else {
        editor.hide_segment(&page, language, segment_id).await?
    };

    let state = if visible { "visible" } else { "hidden" };
    if changed {
        println!(
            "{} Segment {} on {} is now {} ({})",
            style("✓").green(),
            segment_id,
            page,
            state,
            language
        );
    } else {
        println!(
            "{} Segment {} on {} was already {}",
            style("!").yellow(),
            segment_id,
            page,
            state
        );
    }
    Ok(())
}

/// Remove a segment from a page in every language.
pub async fn cmd_remove(settings: &Settings, page: &str, segment_id: i32) -> anyhow::Result<()> {
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;

    if PageEditor::new(&ctx).remove_segment(&page, segment_id).await? {
        println!(
            "{} Removed segment {} from {}",
            style("✓").green(),
            segment_id,
            page
        );
    } else {
        println!(
            "{} Segment {} is not on {}",
            style("!").yellow(),
            segment_id,
            page
        );
    }
    Ok(())
}
