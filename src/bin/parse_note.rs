//! Parse a negotiation note and print it as JSON
//!
//! Run with: cargo run --bin parse_note -- <note.pdf|note.txt> [--lenient] [--password <pw>]... [--snapshot <catalog.json>]
//!
//! Text files are read as already extracted pages separated by form feeds.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use negotiation_notes::catalog::snapshot::default_snapshot_path;
use negotiation_notes::notes::document::{DocumentLoader, PlainTextLoader};
use negotiation_notes::pdf::PdfLoader;
use negotiation_notes::{Catalog, CatalogStore, NoteParser};

struct Args {
    note: PathBuf,
    passwords: Vec<String>,
    lenient: bool,
    snapshot: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut note = None;
    let mut passwords = Vec::new();
    let mut lenient = false;
    let mut snapshot = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lenient" => lenient = true,
            "--password" => passwords.push(args.next().context("--password needs a value")?),
            "--snapshot" => snapshot = Some(PathBuf::from(args.next().context("--snapshot needs a value")?)),
            _ if note.is_none() => note = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument: {}", arg),
        }
    }

    Ok(Args {
        note: note.context("Usage: parse_note <note> [--lenient] [--password <pw>]... [--snapshot <catalog.json>]")?,
        passwords,
        lenient,
        snapshot,
    })
}

fn load_catalog(path: Option<PathBuf>) -> Result<Catalog> {
    let path = match path.or_else(default_snapshot_path) {
        Some(path) if path.exists() => path,
        _ => {
            eprintln!("WARNING: no catalog snapshot found, only built-in assets will resolve");
            return Ok(Catalog::new());
        }
    };
    Catalog::load(&path).with_context(|| format!("Failed to load snapshot {}", path.display()))
}

fn loader_for(path: &Path) -> Arc<dyn DocumentLoader> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Arc::new(PdfLoader)
    } else {
        Arc::new(PlainTextLoader)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    let content = std::fs::read(&args.note).with_context(|| format!("Failed to read {}", args.note.display()))?;
    let catalog = load_catalog(args.snapshot)?;
    let parser = NoteParser::new(Arc::new(CatalogStore::new(catalog)), loader_for(&args.note));

    let note_name = args
        .note
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let notes = parser
        .parse_note(&note_name, &content, &args.passwords, args.lenient)
        .await?;

    println!("{}", serde_json::to_string_pretty(&notes)?);
    Ok(())
}
