use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use embedsync::format::ContentFormat;
use embedsync::types::ResourceGroup;
use embedsync::{commands, watch};

/// Command-line surface.
#[derive(Parser)]
#[command(name = "embedsync", about = "Keep editor content and stored content in sync")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the file ids referenced by a stored-form content file
    FileIds {
        /// Content file to read.
        file: PathBuf,
        /// Content format; inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        content_type: Option<ContentFormat>,
        /// Emit JSON instead of one id per line.
        #[arg(long)]
        json: bool,
    },
    /// Write a starter .embedsync.toml in the current directory
    Init {
        /// API root to record in the config.
        #[arg(long)]
        base_uri: Option<String>,
    },
    /// List referenced file ids across a directory of content files
    Scan {
        /// Directory to walk.
        root: PathBuf,
        /// Emit JSON instead of tab-separated lines.
        #[arg(long)]
        json: bool,
    },
    /// Transform view content into canonical stored form
    Upload {
        /// Content file to read.
        file: PathBuf,
        /// Override the configured API root.
        #[arg(long)]
        base_uri: Option<String>,
        /// Content format; inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        content_type: Option<ContentFormat>,
    },
    /// Resolve file tokens into download URLs for a scope
    View {
        /// Content file to read.
        file: PathBuf,
        /// Override the configured API root.
        #[arg(long)]
        base_uri: Option<String>,
        /// Content format; inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        content_type: Option<ContentFormat>,
        /// Resource group scoping URL resolution.
        #[arg(long, value_enum)]
        resource_group: ResourceGroup,
        /// Optional resource id narrowing the scope.
        #[arg(long)]
        resource_id: Option<String>,
    },
    /// Watch a view-form file and re-derive its stored form on save
    Watch {
        /// Content file to watch.
        file: PathBuf,
        /// Override the configured API root.
        #[arg(long)]
        base_uri: Option<String>,
        /// Content format; inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        content_type: Option<ContentFormat>,
        /// Where to write the derived stored form.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::FileIds {
            file,
            content_type,
            json,
        } => commands::file_ids(&file, content_type, json),
        Commands::Init { base_uri } => {
            commands::init(std::path::Path::new("."), base_uri.as_deref())
        },
        Commands::Scan { root, json } => commands::scan(&root, json),
        Commands::Upload {
            file,
            base_uri,
            content_type,
        } => commands::upload(&file, content_type, base_uri.as_deref()),
        Commands::View {
            file,
            base_uri,
            content_type,
            resource_group,
            resource_id,
        } => commands::view(
            &file,
            content_type,
            base_uri.as_deref(),
            resource_group,
            resource_id.as_deref(),
        ),
        Commands::Watch {
            file,
            base_uri,
            content_type,
            out,
        } => watch::run(&file, &out, content_type, base_uri.as_deref()),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    };
}
