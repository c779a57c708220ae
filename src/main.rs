use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use fs_err::File;
use log::info;
use mystudies_scraping::{
    config::ScrapeOptions, credentials::Credentials, fetch_all, transport::ReqwestTransport,
};

/// Logs in to myStudies and prints the collected academic record as JSON.
#[derive(Parser)]
struct Opts {
    /// JSON file holding `username` and `password`.
    credentials_path: PathBuf,
    /// TOML file with scrape options such as `pacing_ms`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to write the result; standard output if omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let opts = Opts::parse();

    let credentials = Credentials::load(&opts.credentials_path)?;
    let options = match &opts.config {
        Some(path) => ScrapeOptions::load(path)?,
        None => ScrapeOptions::default(),
    };
    let transport = ReqwestTransport::new().context("Failed to build the HTTP client")?;

    let result = fetch_all(&credentials, transport, options, |stage| eprintln!("{stage}"))
        .await
        .context("Scraping failed")?;

    let mut writer: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writeln!(writer)?;
    writer.flush()?;
    if let Some(path) = &opts.output {
        info!("Successfully saved {} credits to {:?}.", result.credits.len(), path);
    }
    Ok(())
}
