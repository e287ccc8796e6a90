//! Chain Integrity Checker.
//!
//! Every step carries a `crc` over its normative fields. A worker recomputes
//! it, then checks ordinals, identifiers and data-flow references, and
//! refuses the whole chain on the first violation.

use crate::{INPUT_ROOT, InputPath, VALUE_ROOT, placeholders};
use serde_json::{Value as JsonValue, json};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use taglink_core::PromptChainStep;
use taglink_error::{IntegrityError, IntegrityErrorKind};

/// Names a step may not use as its output variable.
pub const RESERVED_VARIABLES: [&str; 2] = [INPUT_ROOT, VALUE_ROOT];

/// Canonical encoding of a step's normative fields.
///
/// A JSON array in fixed field order: `step`, `id`, `type`, `input_path`,
/// `prompt_template`, `output_variable`, `output_type`. Prose fields and the
/// checksum itself are excluded.
pub fn canonical_bytes(step: &PromptChainStep) -> Vec<u8> {
    let canonical: JsonValue = json!([
        step.step(),
        step.id(),
        step.kind(),
        step.input_path(),
        step.prompt_template(),
        step.output_variable(),
        step.output_type(),
    ]);
    canonical.to_string().into_bytes()
}

/// Checksum of a step: the first four bytes of SHA-256 over
/// [`canonical_bytes`], big-endian.
///
/// # Examples
///
/// ```
/// use taglink_chain::compute_crc;
/// use taglink_core::PromptChainStep;
///
/// let step = PromptChainStep::builder()
///     .step(1u32)
///     .id("tag")
///     .input_path("input.transcript")
///     .prompt_template("{{value}}")
///     .output_variable("tags")
///     .output_type("List[str]")
///     .build()
///     .unwrap();
///
/// let retitled = PromptChainStep::builder()
///     .step(1u32)
///     .id("tag")
///     .title("Tag the conversation")
///     .input_path("input.transcript")
///     .prompt_template("{{value}}")
///     .output_variable("tags")
///     .output_type("List[str]")
///     .build()
///     .unwrap();
///
/// assert_eq!(compute_crc(&step), compute_crc(&retitled));
/// ```
pub fn compute_crc(step: &PromptChainStep) -> u32 {
    let digest = Sha256::digest(canonical_bytes(step));
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Store a freshly computed checksum on every step.
///
/// Coordinator side: call once the chain is final.
pub fn seal(chain: Vec<PromptChainStep>) -> Vec<PromptChainStep> {
    chain
        .into_iter()
        .map(|step| {
            let crc = compute_crc(&step);
            step.with_crc(crc)
        })
        .collect()
}

/// Verify a prompt chain before any step runs.
///
/// # Errors
///
/// Returns the first violation found: an empty chain, a checksum mismatch,
/// duplicate or non-contiguous ordinals, duplicate step ids, a duplicate or
/// invalid output variable, or an `input_path`/template placeholder that is
/// malformed or does not point at `input` or a strictly earlier step.
#[tracing::instrument(skip(chain), fields(steps = chain.len()))]
pub fn verify(chain: &[PromptChainStep]) -> Result<(), IntegrityError> {
    if chain.is_empty() {
        return Err(IntegrityError::new(IntegrityErrorKind::EmptyChain));
    }

    for step in chain {
        let computed = compute_crc(step);
        if computed != *step.crc() {
            tracing::warn!(step_id = %step.id(), stored = step.crc(), computed, "Checksum mismatch");
            return Err(IntegrityError::new(IntegrityErrorKind::ChecksumMismatch {
                step_id: step.id().clone(),
                stored: *step.crc(),
                computed,
            }));
        }
    }

    check_ordinals(chain)?;

    let mut ids = HashSet::new();
    let mut producers: HashMap<&str, u32> = HashMap::new();
    for step in chain {
        if !ids.insert(step.id().as_str()) {
            return Err(IntegrityError::new(IntegrityErrorKind::DuplicateStepId(
                step.id().clone(),
            )));
        }

        let name = step.output_variable();
        if !is_identifier(name) || RESERVED_VARIABLES.contains(&name.as_str()) {
            return Err(IntegrityError::new(
                IntegrityErrorKind::InvalidOutputVariable {
                    step_id: step.id().clone(),
                    name: name.clone(),
                },
            ));
        }
        if producers.insert(name.as_str(), *step.step()).is_some() {
            return Err(IntegrityError::new(
                IntegrityErrorKind::DuplicateOutputVariable(name.clone()),
            ));
        }
    }

    for step in chain {
        check_reference(step, step.input_path(), false, &producers)?;

        let found = placeholders(step.prompt_template()).map_err(|_| {
            IntegrityError::new(IntegrityErrorKind::MalformedPath {
                step_id: step.id().clone(),
                path: step.prompt_template().clone(),
            })
        })?;
        for path in &found {
            check_reference(step, path, true, &producers)?;
        }
    }

    tracing::debug!("Prompt chain verified");
    Ok(())
}

fn check_ordinals(chain: &[PromptChainStep]) -> Result<(), IntegrityError> {
    let mut ordinals: Vec<u32> = chain.iter().map(|step| *step.step()).collect();
    ordinals.sort_unstable();

    for pair in ordinals.windows(2) {
        if pair[0] == pair[1] {
            return Err(IntegrityError::new(IntegrityErrorKind::DuplicateOrdinal(
                pair[0],
            )));
        }
    }

    for (expected, found) in (1u32..).zip(ordinals) {
        if expected != found {
            return Err(IntegrityError::new(
                IntegrityErrorKind::NonContiguousOrdinals { expected, found },
            ));
        }
    }
    Ok(())
}

/// A reference may point at `input`, at `value` inside a template, or at the
/// output variable of a strictly earlier step.
fn check_reference(
    step: &PromptChainStep,
    raw: &str,
    in_template: bool,
    producers: &HashMap<&str, u32>,
) -> Result<(), IntegrityError> {
    let step_id = step.id().clone();
    let path: InputPath = raw.parse().map_err(|_| {
        IntegrityError::new(IntegrityErrorKind::MalformedPath {
            step_id: step_id.clone(),
            path: raw.to_string(),
        })
    })?;

    let root = path.root();
    if root == INPUT_ROOT || (in_template && root == VALUE_ROOT) {
        return Ok(());
    }

    let path = raw.to_string();
    match producers.get(root) {
        Some(&producer) if producer < *step.step() => Ok(()),
        Some(&producer) if producer == *step.step() => Err(IntegrityError::new(
            IntegrityErrorKind::SelfReference { step_id, path },
        )),
        Some(_) => Err(IntegrityError::new(
            IntegrityErrorKind::ForwardReference { step_id, path },
        )),
        None => Err(IntegrityError::new(
            IntegrityErrorKind::UnknownReference { step_id, path },
        )),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
