//! pdfconvert command-line driver
//!
//! Runs one conversion and writes its outputs into a directory.

mod commands;

use clap::Parser;
use commands::Command;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdfconvert")]
#[command(version, about = "Convert office documents and images to PDF and edit PDFs")]
struct Args {
    /// Directory outputs are written into
    #[arg(short, long, global = true, default_value = ".")]
    out: PathBuf,

    /// TOML file overriding layout defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bundle every output into one zip archive with this name
    #[arg(long, global = true)]
    zip: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout stays free for the list of written files
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(args.config.as_deref())?;
    let outputs = commands::execute(&args.command, config)?;
    let written = commands::save(&outputs, &args.out, args.zip.as_deref())?;

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
