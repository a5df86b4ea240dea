//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod asset;
mod helpers;
mod init;
mod migrate;
mod page;
mod segment;
mod serve;
mod translate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "sitecms")]
#[command(about = "Segment-based page content service")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:3030)
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Inspect and edit page content
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },

    /// Manage segments and their registry entries
    Segment {
        #[command(subcommand)]
        command: SegmentCommands,
    },

    /// Manage stored images and their mappings
    Asset {
        #[command(subcommand)]
        command: AssetCommands,
    },

    /// Convert legacy page content
    Migrate {
        #[command(subcommand)]
        command: MigrateCommands,
    },

    /// Machine-translate content with the configured LLM
    Translate {
        #[command(subcommand)]
        command: TranslateCommands,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// Show a page's assembled segments
    Show {
        /// Page slug (e.g. home, products/cameras)
        page: String,
        /// Language code
        #[arg(short, long, default_value = "en")]
        lang: String,
        /// Print rendered HTML instead of segment JSON
        #[arg(long)]
        html: bool,
    },
    /// Set a raw content row
    Set {
        page: String,
        /// Section key (e.g. hero_title)
        key: String,
        /// Value to store
        value: String,
        #[arg(short, long, default_value = "en")]
        lang: String,
        /// Store as JSON (validated)
        #[arg(long)]
        json: bool,
    },
    /// Hide a segment without deleting it
    Hide {
        page: String,
        segment_id: i32,
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
    /// Make a hidden segment visible again
    ShowSegment {
        page: String,
        segment_id: i32,
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
    /// Remove a segment from the page in every language
    Remove { page: String, segment_id: i32 },
}

#[derive(Subcommand)]
enum SegmentCommands {
    /// Add a segment to a page
    Add {
        page: String,
        /// Segment type (full-hero, banner, text, image-text, faq, table, video,
        /// specification, news-list, debug)
        segment_type: String,
        /// Segment data as JSON
        #[arg(short, long, default_value = "{}")]
        data: String,
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
    /// Soft-delete a segment in the registry
    Delete { segment_id: i32 },
    /// List registry entries of a page
    List {
        page: String,
        /// Include soft-deleted entries
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum AssetCommands {
    /// Show resolved alt text for an image URL
    AltText {
        url: String,
        #[arg(short, long, default_value = "en")]
        lang: String,
        /// Bucket (defaults to the configured bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Record that a segment uses an image
    Link {
        url: String,
        segment_id: i32,
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Drop a segment reference from an image
    Unlink {
        url: String,
        segment_id: i32,
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Set alt text for an image in one language
    SetAlt {
        url: String,
        text: String,
        #[arg(short, long, default_value = "en")]
        lang: String,
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Find (and delete) images no live segment references
    Cleanup {
        #[arg(short, long)]
        bucket: Option<String>,
        /// Only report orphans
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Convert flat hero_* rows into a full-hero segment
    Hero {
        page: String,
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
}

#[derive(Subcommand)]
enum TranslateCommands {
    /// Translate a piece of text
    Text {
        text: String,
        #[arg(long, default_value = "en")]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Translate every segment of a page into a language overlay
    Page {
        page: String,
        #[arg(long, default_value = "en")]
        from: String,
        #[arg(long)]
        to: String,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut settings, _config) = load_settings(cli.config.as_deref()).await?;
    if let Some(data_dir) = cli.data_dir {
        let data_dir = std::fs::canonicalize(&data_dir).unwrap_or(data_dir);
        settings.storage_dir = data_dir.join(crate::config::STORAGE_SUBDIR);
        settings.data_dir = data_dir;
    }

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Page { command } => match command {
            PageCommands::Show { page, lang, html } => {
                page::cmd_show(&settings, &page, &lang, html).await
            }
            PageCommands::Set {
                page,
                key,
                value,
                lang,
                json,
            } => page::cmd_set(&settings, &page, &key, &value, &lang, json).await,
            PageCommands::Hide {
                page,
                segment_id,
                lang,
            } => page::cmd_visibility(&settings, &page, segment_id, &lang, false).await,
            PageCommands::ShowSegment {
                page,
                segment_id,
                lang,
            } => page::cmd_visibility(&settings, &page, segment_id, &lang, true).await,
            PageCommands::Remove { page, segment_id } => {
                page::cmd_remove(&settings, &page, segment_id).await
            }
        },
        Commands::Segment { command } => match command {
            SegmentCommands::Add {
                page,
                segment_type,
                data,
                lang,
            } => segment::cmd_add(&settings, &page, &segment_type, &data, &lang).await,
            SegmentCommands::Delete { segment_id } => {
                segment::cmd_delete(&settings, segment_id).await
            }
            SegmentCommands::List { page, all } => segment::cmd_list(&settings, &page, all).await,
        },
        Commands::Asset { command } => match command {
            AssetCommands::AltText { url, lang, bucket } => {
                asset::cmd_alt_text(&settings, &url, &lang, bucket.as_deref()).await
            }
            AssetCommands::Link {
                url,
                segment_id,
                bucket,
            } => asset::cmd_link(&settings, &url, segment_id, bucket.as_deref(), true).await,
            AssetCommands::Unlink {
                url,
                segment_id,
                bucket,
            } => asset::cmd_link(&settings, &url, segment_id, bucket.as_deref(), false).await,
            AssetCommands::SetAlt {
                url,
                text,
                lang,
                bucket,
            } => asset::cmd_set_alt(&settings, &url, &text, &lang, bucket.as_deref()).await,
            AssetCommands::Cleanup {
                bucket,
                dry_run,
                json,
            } => asset::cmd_cleanup(&settings, bucket.as_deref(), dry_run, json).await,
        },
        Commands::Migrate { command } => match command {
            MigrateCommands::Hero { page, lang } => {
                migrate::cmd_migrate_hero(&settings, &page, &lang).await
            }
        },
        Commands::Translate { command } => match command {
            TranslateCommands::Text { text, from, to } => {
                translate::cmd_translate_text(&settings, &text, &from, &to).await
            }
            TranslateCommands::Page { page, from, to } => {
                translate::cmd_translate_page(&settings, &page, &from, &to).await
            }
        },
    }
}
