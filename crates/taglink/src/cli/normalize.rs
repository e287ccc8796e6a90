//! Source normalization handler.

use std::path::Path;
use taglink::{RawSource, TaglinkResult, normalize, parse_input_kind, read_json, to_pretty_json};

/// Normalize a raw source file and print the resulting task input.
#[tracing::instrument(skip_all, fields(source = %source.display(), kind = %kind))]
pub fn normalize_source(source: &Path, kind: &str) -> TaglinkResult<()> {
    let kind = parse_input_kind(kind)?;
    let raw: RawSource = read_json(source)?;
    let input = normalize(raw, kind)?;
    println!("{}", to_pretty_json(&input)?);
    Ok(())
}
