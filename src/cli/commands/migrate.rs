//! Legacy content migration commands.

use console::style;

use super::helpers::{open_context, parse_language};
use crate::config::Settings;
use crate::content::{normalize_slug, PageEditor};

/// Convert flat `hero_*` rows of a page into a `full-hero` segment.
pub async fn cmd_migrate_hero(settings: &Settings, page: &str, lang: &str) -> anyhow::Result<()> {
    let language = parse_language(lang)?;
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;

    match PageEditor::new(&ctx).migrate_flat_hero(&page, language).await? {
        Some(segment) => println!(
            "{} Created full-hero segment {} on {} ({})",
            style("✓").green(),
            segment.id,
            page,
            language
        ),
        None => println!(
            "{} Nothing to migrate on {} ({})",
            style("!").yellow(),
            page,
            language
        ),
    }
    Ok(())
}
