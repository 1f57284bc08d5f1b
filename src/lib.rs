//! # Chisel - JSON Structure Selection
//!
//! Carve the parts you need out of a JSON tree with a small selector language:
//! keep only some fields, drop others, or move the root to a nested node.
//!
//! ## Modules
//!
//! - **select**: selector parser, array subsets, and the include/exclude tree walkers
//! - **engine**: the [`Chisel`] orchestrator with its selector cache
//! - **fields**: the `{root, include, exclude}` request
//!
//! ## Quick Start
//!
//! ### Keeping fields
//!
//! ```rust
//! use chisel::{Chisel, Fields};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), chisel::SelectError> {
//! let person = json!({
//!     "name": "Alice",
//!     "password": "hunter2",
//!     "logins": ["mon", "tue", "wed"],
//!     "account": {"username": "alice", "plan": "pro"}
//! });
//!
//! let chisel = Chisel::new();
//! let view = chisel.project(person, &Fields::including("name logins[-1] account.username"))?;
//!
//! assert_eq!(view, json!({
//!     "name": "Alice",
//!     "logins": ["wed"],
//!     "account": {"username": "alice"}
//! }));
//! # Ok(())
//! # }
//! ```
//!
//! ### Re-rooting and dropping fields
//!
//! ```rust
//! use chisel::Fields;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), chisel::SelectError> {
//! let people = json!([
//!     {"name": "test1", "pojos": [{"name": "a"}]},
//!     {"name": "test2", "pojos": [{"name": "b"}]}
//! ]);
//!
//! let second = chisel::project(people, &Fields::rooted("[1]").with_exclude("pojos"))?;
//! assert_eq!(second, json!({"name": "test2"}));
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::io::{BufRead, Read, Write};

pub mod engine;
pub mod error;
pub mod fields;
pub mod select;

// Re-export commonly used types for convenience
pub use engine::Chisel;
pub use error::{Result, SelectError};
pub use fields::Fields;
pub use select::{parse, Selector, SelectorCache};

static DEFAULT_ENGINE: Lazy<Chisel> = Lazy::new(Chisel::new);

/// Project `tree` with a process-wide engine
///
/// The shared engine caches every selector it sees. Services that accept
/// selector text from users should own a [`Chisel::without_cache`] instead.
pub fn project(tree: Value, fields: &Fields) -> Result<Value> {
    DEFAULT_ENGINE.project(tree, fields)
}

fn write_value<W: Write>(writer: &mut W, value: &Value, compact: bool) -> anyhow::Result<()> {
    let written = if compact {
        serde_json::to_writer(&mut *writer, value)
    } else {
        serde_json::to_writer_pretty(&mut *writer, value)
    };
    written.context("Failed to serialize JSON")?;
    writeln!(writer).context("Failed to write output")?;
    Ok(())
}

/// Parse a whole document, trying SIMD parsing first (faster)
fn parse_document(mut content: Vec<u8>) -> anyhow::Result<Value> {
    // simd-json parses in place, so keep a copy for the fallback
    let original = content.clone();

    match simd_json::serde::from_slice::<Value>(&mut content) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::debug!(%err, "simd-json rejected input, retrying with serde_json");
            serde_json::from_slice(&original).context("Failed to parse JSON")
        }
    }
}

/// Main entry point: project a JSON document, or a stream of NDJSON lines
///
/// Each projected document is written on its own line. NDJSON output is always
/// compact; a single document is pretty-printed unless `compact` is set.
/// Returns how many documents were written.
pub fn project_json<R: BufRead, W: Write>(
    mut reader: R,
    writer: &mut W,
    fields: &Fields,
    ndjson: bool,
    compact: bool,
) -> anyhow::Result<usize> {
    let chisel = &*DEFAULT_ENGINE;

    if !ndjson {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .context("Failed to read input")?;
        let value = parse_document(content)?;

        let projected = chisel.project(value, fields)?;
        write_value(writer, &projected, compact)?;
        return Ok(1);
    }

    let mut written = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;
        let projected = chisel
            .project(value, fields)
            .with_context(|| format!("Failed to project line {}", line_no + 1))?;

        write_value(writer, &projected, true)?;
        written += 1;
    }

    Ok(written)
}
