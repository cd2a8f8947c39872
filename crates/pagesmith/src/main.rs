/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pagesmith CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod project_file;

use config::Config;

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(version)]
#[command(about = "Build, edit, export and share template-based web pages", long_about = None)]
struct Cli {
    /// Path to pagesmith.yml (defaults to ./pagesmith.yml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    Templates {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// List the editable slots of a template
    Slots {
        /// Template id
        template: String,
    },

    /// Create a project in the store
    New {
        /// Project name
        name: String,

        /// Template id
        #[arg(short, long, default_value = "general-content")]
        template: String,

        /// Theme id (templates that declare themes)
        #[arg(long)]
        theme: Option<String>,
    },

    /// Export a project to a standalone HTML file
    Export {
        /// Project file or stored project id
        project: Option<String>,

        /// Template id (overrides the project's template)
        #[arg(short, long)]
        template: Option<String>,

        /// Content map JSON file (when exporting without a project)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Project name used for the title and file name
        #[arg(long)]
        name: Option<String>,

        /// Theme id (overrides the project's theme)
        #[arg(long)]
        theme: Option<String>,

        /// Output directory, or '-' for stdout
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Change the content of one slot
    #[command(group(ArgGroup::new("value").required(true).multiple(true).args(["text", "image", "button_text", "button_url"])))]
    Edit {
        /// Project file or stored project id
        project: String,

        /// Slot id
        eid: String,

        /// New text
        #[arg(long, conflicts_with_all = ["image", "button_text", "button_url"])]
        text: Option<String>,

        /// New image source
        #[arg(long, conflicts_with_all = ["button_text", "button_url"])]
        image: Option<String>,

        /// Click-through link for the image
        #[arg(long, requires = "image")]
        link: Option<String>,

        /// New button label
        #[arg(long)]
        button_text: Option<String>,

        /// New button target
        #[arg(long)]
        button_url: Option<String>,
    },

    /// Set a stored project's custom URL and print its share link
    Share {
        /// Stored project id
        project_id: String,

        /// Custom URL slug (letters, numbers, '-' and '_')
        slug: String,
    },

    /// Create an extra share link, optionally expiring or view-limited
    Link {
        /// Stored project id
        project_id: String,

        /// Link slug (letters, numbers, '-' and '_')
        slug: String,

        /// Days until the link expires
        #[arg(long)]
        expires_days: Option<u32>,

        /// Number of views allowed (0 for unlimited)
        #[arg(long)]
        max_views: Option<u64>,
    },

    /// Render the page published under a share link, custom URL or id
    View {
        /// Link slug, custom URL or project id
        slug: String,

        /// Output directory, or '-' for stdout (the default)
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// List stored projects with their share links
    Projects,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.quiet {
        "pagesmith=warn"
    } else {
        "pagesmith=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Templates { json } => commands::templates::execute(&config, json),
        Commands::Slots { template } => commands::slots::execute(&config, &template),
        Commands::New {
            name,
            template,
            theme,
        } => commands::new::execute(&config, &name, &template, theme.as_deref()),
        Commands::Export {
            project,
            template,
            data,
            name,
            theme,
            output,
        } => commands::export::execute(
            &config,
            commands::export::ExportArgs {
                project,
                template,
                data,
                name,
                theme,
                output,
            },
        ),
        Commands::Edit {
            project,
            eid,
            text,
            image,
            link,
            button_text,
            button_url,
        } => commands::edit::execute(
            &config,
            commands::edit::EditArgs {
                project,
                eid,
                text,
                image,
                link,
                button_text,
                button_url,
            },
        ),
        Commands::Share { project_id, slug } => {
            commands::share::execute(&config, &project_id, &slug)
        }
        Commands::Link {
            project_id,
            slug,
            expires_days,
            max_views,
        } => commands::link::execute(
            &config,
            commands::link::LinkArgs {
                project_id,
                slug,
                expires_days,
                max_views,
            },
        ),
        Commands::View { slug, output } => {
            commands::view::execute(&config, &slug, output.as_deref())
        }
        Commands::Projects => commands::projects::execute(&config),
    }
}
