//! chisel: select, prune and re-root JSON documents
//!
//! Usage:
//!   # Keep a few fields of every person in a file
//!   chisel people.json --include "firstName lastName account.username"
//!
//!   # Drop fields from a stream of NDJSON records read from stdin
//!   cat events.jsonl | chisel --ndjson --exclude "payload.secret"
//!
//!   # Move the root to the second element and drop its children
//!   chisel people.json --root "[1]" --exclude pojos
//!
//!   # Load the request from a file ({"root", "include", "exclude"} or view/select/drop)
//!   chisel people.json --fields request.json
//!
//! Logging goes to stderr and is controlled with RUST_LOG (default: warn).

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use chisel::{project_json, Fields};
use clap::Parser;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chisel")]
#[command(about = "Select, prune and re-root JSON documents", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Move the root before selecting, e.g. "[0]", "[-1].account" or "purchases.items"
    #[arg(long)]
    root: Option<String>,

    /// Keep only these fields, e.g. "name pojos[1:2]{ name }"
    #[arg(long, short = 'i')]
    include: Option<String>,

    /// Remove these fields, e.g. "account.password logins[-1]"
    #[arg(long, short = 'e')]
    exclude: Option<String>,

    /// JSON file holding the request; flags override its values
    #[arg(long)]
    fields: Option<String>,

    /// Process newline-delimited JSON (one JSON document per line)
    #[arg(long)]
    ndjson: bool,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let fields = build_fields(&args)?;
    debug!(?fields, "request");

    let reader: Box<dyn BufRead> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path).with_context(|| format!("Failed to open {}", file_path))?,
        ))
    } else {
        Box::new(BufReader::new(std::io::stdin()))
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let written = project_json(reader, &mut out, &fields, args.ndjson, args.compact)?;
    debug!(written, "done");

    out.flush()?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Start from the --fields file, if any, and let individual flags override it
fn build_fields(args: &Args) -> Result<Fields> {
    let mut fields = match &args.fields {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse request in {}", path))?
        }
        None => Fields::new(),
    };

    if let Some(root) = &args.root {
        fields = fields.with_root(root.as_str());
    }
    if let Some(include) = &args.include {
        fields = fields.with_include(include.as_str());
    }
    if let Some(exclude) = &args.exclude {
        fields = fields.with_exclude(exclude.as_str());
    }

    if fields.is_empty() {
        warn!("no --root, --include or --exclude given; output equals input");
    }

    Ok(fields)
}
