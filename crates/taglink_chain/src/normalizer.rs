//! Input normalization.
//!
//! Converts raw source material into exactly one [`TaskInput`] variant and
//! re-checks inputs that arrive already normalized inside a task.

use std::str::FromStr;
use taglink_core::{ConversationInput, InputKind, TaskInput, WebpageMarkdownInput};
use taglink_error::{ShapeError, ShapeErrorKind};
use taglink_interface::{RawSource, SourceProvider};

/// Parse an `input_type` discriminator.
///
/// # Errors
///
/// Returns an error for any string that is not a known input kind.
///
/// # Examples
///
/// ```
/// use taglink_chain::parse_input_kind;
/// use taglink_core::InputKind;
///
/// assert_eq!(parse_input_kind("conversation").unwrap(), InputKind::Conversation);
/// assert!(parse_input_kind("podcast").is_err());
/// ```
pub fn parse_input_kind(input_type: &str) -> Result<InputKind, ShapeError> {
    InputKind::from_str(input_type)
        .map_err(|_| ShapeError::new(ShapeErrorKind::UnknownInputType(input_type.to_string())))
}

/// Normalize raw source material into the requested input shape.
///
/// # Errors
///
/// Returns a shape mismatch if the guid is empty, a conversation line names a
/// speaker outside `participants`, a declared `total` disagrees with the
/// lines present, or webpage block indices decrease.
#[tracing::instrument(skip(raw), fields(guid = %raw.guid, lines = raw.lines.len()))]
pub fn normalize(raw: RawSource, kind: InputKind) -> Result<TaskInput, ShapeError> {
    if raw.guid.trim().is_empty() {
        return Err(ShapeError::new(ShapeErrorKind::EmptyGuid));
    }

    match kind {
        InputKind::Conversation => {
            check_speakers(&raw.lines, raw.participants.len())?;
            if let Some(declared) = raw.total {
                check_total(declared, raw.lines.len())?;
            }
            Ok(ConversationInput::new(raw.guid, raw.participants, raw.lines).into())
        }
        InputKind::WebpageMarkdown => {
            check_block_order(&raw.lines)?;
            Ok(WebpageMarkdownInput::new(raw.guid, raw.lines).into())
        }
    }
}

/// Fetch content through the source collaborator and normalize it.
///
/// # Errors
///
/// Returns a shape mismatch if the collaborator fails or the content does
/// not fit `kind`.
#[tracing::instrument(skip(provider))]
pub async fn load<P: SourceProvider + ?Sized>(
    provider: &P,
    guid: &str,
    kind: InputKind,
) -> Result<TaskInput, ShapeError> {
    let raw = provider.fetch(guid).await.map_err(|e| {
        tracing::error!(guid, error = %e, "Source content unavailable");
        ShapeError::new(ShapeErrorKind::SourceUnavailable {
            guid: guid.to_string(),
            message: e.to_string(),
        })
    })?;
    normalize(raw, kind)
}

/// Re-check an input that arrived already normalized, e.g. off the wire.
///
/// # Errors
///
/// Returns the same shape mismatches as [`normalize`].
pub fn check_input(input: &TaskInput) -> Result<(), ShapeError> {
    if input.guid().trim().is_empty() {
        return Err(ShapeError::new(ShapeErrorKind::EmptyGuid));
    }

    match input {
        TaskInput::Conversation(convo) => {
            check_speakers(convo.lines(), convo.participants().len())?;
            check_total(*convo.total(), convo.lines().len())
        }
        TaskInput::WebpageMarkdown(page) => check_block_order(page.lines()),
    }
}

fn check_speakers(lines: &[(usize, String)], participants: usize) -> Result<(), ShapeError> {
    match lines
        .iter()
        .enumerate()
        .find(|(_, (speaker, _))| *speaker >= participants)
    {
        Some((line, (speaker, _))) => Err(ShapeError::new(ShapeErrorKind::UnknownSpeaker {
            line,
            speaker: *speaker,
            participants,
        })),
        None => Ok(()),
    }
}

fn check_total(declared: usize, actual: usize) -> Result<(), ShapeError> {
    if declared != actual {
        return Err(ShapeError::new(ShapeErrorKind::TotalMismatch { declared, actual }));
    }
    Ok(())
}

fn check_block_order(lines: &[(usize, String)]) -> Result<(), ShapeError> {
    for (position, pair) in lines.windows(2).enumerate() {
        let (previous, index) = (pair[0].0, pair[1].0);
        if index < previous {
            return Err(ShapeError::new(ShapeErrorKind::NonMonotonicBlocks {
                position: position + 1,
                index,
                previous,
            }));
        }
    }
    Ok(())
}
