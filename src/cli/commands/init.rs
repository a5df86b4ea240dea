//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    std::fs::create_dir_all(settings.storage_dir.join(&settings.default_bucket))?;

    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    println!(
        "{} Initialized sitecms in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!(
        "  Images are stored under {}",
        settings.storage_dir.display()
    );
    if settings.admin_token.is_none() {
        println!(
            "{} No admin token configured; set SITECMS_ADMIN_TOKEN to enable the admin API",
            style("!").yellow()
        );
    }

    Ok(())
}
