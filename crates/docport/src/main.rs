use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use docport::config::Config;
use docport::drive::DriveConfig;
use docport::drive::upload::UploadWorkflow;

#[derive(Parser)]
#[command(
    name = "docport",
    about = "Convert Markdown to standalone HTML and push it into Google Docs"
)]
struct Cli {
    /// Configuration file.
    #[arg(long, default_value = "docport.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a markdown file into a standalone HTML page.
    Convert {
        /// Input markdown file.
        input: PathBuf,
        /// Output HTML file.
        output: PathBuf,
        /// Document title for the page shell.
        title: String,
    },
    /// Upload an HTML file to Google Docs.
    Upload {
        /// HTML file to upload.
        file: PathBuf,
        /// Document title (defaults to the file name).
        #[arg(long)]
        title: Option<String>,
        /// Access token (otherwise read from the configured token file).
        #[arg(long)]
        token: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Convert {
            input,
            output,
            title,
        } => {
            docport::convert(&input, &output, &title, &config)?;
        }
        Command::Upload { file, title, token } => {
            let html = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let title = title.unwrap_or_else(|| title_from_path(&file));

            let drive = DriveConfig::from_section(&config.drive, token)?;
            let doc = UploadWorkflow::new(&drive).run(&title, &html)?;
            println!("✓ Document created: {}", doc.url);
        }
    }

    Ok(())
}

/// Default document title: the file stem with underscores as spaces and each
/// word capitalized.
fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
