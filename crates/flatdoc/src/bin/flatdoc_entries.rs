//! `flatdoc-entries`: print the flat entry table of a JSON document.
//!
//! Usage:
//!   flatdoc-entries [--root]
//!
//! The document is read from stdin. By default the entry records are
//! printed; `--root` prints the document rehydrated from its root key.
//! Log output is controlled by `RUST_LOG` (default `flatdoc=info`).

use flatdoc::inspect::{inspect_document, InspectError, InspectMode};
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flatdoc=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mode = match std::env::args().nth(1).as_deref() {
        None => InspectMode::Entries,
        Some("--root") => InspectMode::Root,
        Some(other) => {
            eprintln!("Unknown argument: {other}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(mode) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(mode: InspectMode) -> Result<(), InspectError> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let out = inspect_document(buf.trim(), mode)?;
    let mut stdout = io::stdout();
    stdout.write_all(out.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
