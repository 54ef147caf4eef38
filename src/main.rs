//! shdocgen — extract structured documentation from annotated shell scripts.
//!
//! Scans a script's comment lines for `@tag` annotations and assembles a
//! nested tree of file / section / function / variable nodes, emitted as
//! JSON or as a human-readable dump.

mod model;
mod parser;

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shdocgen",
    about = "Parse documentation of a shell file and return it as JSON"
)]
struct Cli {
    /// Shell script to parse
    script: PathBuf,

    /// Emit JSON instead of the human-readable dump
    #[arg(long)]
    json: bool,

    /// Also include undocumented functions/variables whose name matches
    /// this regex
    #[arg(long, value_name = "REGEX")]
    include: Option<String>,

    /// Print only the first node with this name instead of the whole tree
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Increase diagnostic verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let include = cli
        .include
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --include pattern")?;

    let parsed = parser::parse_script(&cli.script, include.as_ref())?;
    for warning in &parsed.warnings {
        tracing::warn!("{warning}");
    }

    let node = match &cli.name {
        Some(name) => parsed
            .root
            .find(name)
            .with_context(|| format!("no node named '{name}' in {}", cli.script.display()))?,
        None => &parsed.root,
    };

    if cli.json {
        println!("{}", serde_json::to_string(node)?);
    } else {
        println!("{node:#?}");
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
