use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use team_roster::{
    extract_roster,
    output::{self, Shape},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Extract the team roster from a festival spreadsheet and print it as JSON.
#[derive(Debug, Parser)]
#[command(name = "team-roster", version)]
struct Cli {
    /// Path to the .xlsx workbook
    xlsx_path: PathBuf,

    /// Emit an object keyed by member id instead of an array
    #[arg(long)]
    keyed: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ─── 1) init logging (stderr; stdout carries the JSON) ──────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) sheet → members ─────────────────────────────────────────
    let members = extract_roster(&cli.xlsx_path)
        .with_context(|| format!("extracting roster from {}", cli.xlsx_path.display()))?;
    info!(members = members.len(), "extracted roster");

    // ─── 3) serialize ───────────────────────────────────────────────
    let shape = if cli.keyed { Shape::Keyed } else { Shape::Array };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::write_members(&mut out, &members, shape).context("writing roster JSON")?;
    writeln!(out).context("writing roster JSON")?;
    out.flush()?;

    Ok(())
}
