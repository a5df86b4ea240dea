//! Translation commands.

use console::style;

use super::helpers::{open_context, parse_language};
use crate::config::Settings;
use crate::content::normalize_slug;
use crate::translate::{translate_page, TranslationClient, Translator};

/// Translate a piece of text and print it.
pub async fn cmd_translate_text(
    settings: &Settings,
    text: &str,
    from: &str,
    to: &str,
) -> anyhow::Result<()> {
    let from = parse_language(from)?;
    let to = parse_language(to)?;
    let client = TranslationClient::new(settings.translation.clone())?;

    let translated = client.translate_text(text, from, to).await?;
    println!("{}", translated);
    Ok(())
}

/// Translate a page's segments into a language overlay.
pub async fn cmd_translate_page(
    settings: &Settings,
    page: &str,
    from: &str,
    to: &str,
) -> anyhow::Result<()> {
    let from = parse_language(from)?;
    let to = parse_language(to)?;
    if from == to {
        anyhow::bail!("Source and target language are both {}", from);
    }
    let page = normalize_slug(page);
    let ctx = open_context(settings).await?;
    let client = TranslationClient::new(settings.translation.clone())?;

    println!(
        "{} Translating {} from {} to {} with {}",
        style("→").cyan(),
        page,
        from,
        to,
        client.config().model
    );
    let count = translate_page(&ctx, &client, &page, from, to).await?;
    println!(
        "{} Translated {} segments",
        style("✓").green(),
        count
    );
    Ok(())
}
