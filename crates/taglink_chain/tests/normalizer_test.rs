use async_trait::async_trait;
use std::collections::HashMap;
use taglink_chain::{check_input, load, normalize, parse_input_kind};
use taglink_core::{ConversationInput, InputKind, TaskInput};
use taglink_error::{ConfigError, ShapeErrorKind, TaglinkResult};
use taglink_interface::{RawSource, SourceProvider};

fn raw_conversation() -> RawSource {
    RawSource {
        guid: "convo-1".to_string(),
        participants: vec!["host".to_string(), "guest".to_string()],
        lines: vec![
            (0, "Welcome to the show".to_string()),
            (1, "Thanks for having me".to_string()),
            (0, "Let's talk about gardening".to_string()),
        ],
        total: None,
    }
}

#[test]
fn conversation_total_is_line_count() {
    let input = normalize(raw_conversation(), InputKind::Conversation).unwrap();
    let TaskInput::Conversation(convo) = input else {
        panic!("expected a conversation");
    };
    assert_eq!(*convo.total(), 3);
    assert_eq!(convo.participants().len(), 2);
}

#[test]
fn unknown_speaker_is_a_shape_mismatch() {
    let mut raw = raw_conversation();
    raw.lines.push((2, "Who said that?".to_string()));

    let err = normalize(raw, InputKind::Conversation).unwrap_err();
    assert_eq!(
        err.kind,
        ShapeErrorKind::UnknownSpeaker {
            line: 3,
            speaker: 2,
            participants: 2,
        }
    );
}

#[test]
fn declared_total_must_match_lines() {
    let mut raw = raw_conversation();
    raw.total = Some(5);

    let err = normalize(raw, InputKind::Conversation).unwrap_err();
    assert_eq!(
        err.kind,
        ShapeErrorKind::TotalMismatch {
            declared: 5,
            actual: 3,
        }
    );

    let mut raw = raw_conversation();
    raw.total = Some(3);
    assert!(normalize(raw, InputKind::Conversation).is_ok());
}

#[test]
fn webpage_blocks_must_not_go_backwards() {
    let raw = RawSource {
        guid: "page-1".to_string(),
        lines: vec![
            (0, "# Heading".to_string()),
            (1, "para".to_string()),
            (1, "same block continued".to_string()),
            (0, "back to start".to_string()),
        ],
        ..Default::default()
    };

    let err = normalize(raw, InputKind::WebpageMarkdown).unwrap_err();
    assert_eq!(
        err.kind,
        ShapeErrorKind::NonMonotonicBlocks {
            position: 3,
            index: 0,
            previous: 1,
        }
    );
}

#[test]
fn webpage_ignores_participants() {
    let mut raw = raw_conversation();
    raw.participants.clear();

    let input = normalize(raw, InputKind::WebpageMarkdown).unwrap();
    assert_eq!(input.kind(), InputKind::WebpageMarkdown);
    assert_eq!(input.lines().len(), 3);
}

#[test]
fn empty_guid_is_rejected() {
    let mut raw = raw_conversation();
    raw.guid = "  ".to_string();
    assert_eq!(
        normalize(raw, InputKind::Conversation).unwrap_err().kind,
        ShapeErrorKind::EmptyGuid
    );
}

#[test]
fn unknown_input_type_is_rejected() {
    assert_eq!(
        parse_input_kind("webpage_markdown").unwrap(),
        InputKind::WebpageMarkdown
    );
    assert_eq!(
        parse_input_kind("audio").unwrap_err().kind,
        ShapeErrorKind::UnknownInputType("audio".to_string())
    );
}

#[test]
fn check_catches_wire_inputs_that_bypassed_normalization() {
    let value = serde_json::json!({
        "input_type": "conversation",
        "guid": "convo-9",
        "data": {"participants": ["a"], "lines": [[0, "hi"], [0, "there"]], "total": 7}
    });
    let input: TaskInput = serde_json::from_value(value).unwrap();

    assert_eq!(
        check_input(&input).unwrap_err().kind,
        ShapeErrorKind::TotalMismatch {
            declared: 7,
            actual: 2,
        }
    );

    let valid: TaskInput =
        ConversationInput::new("convo-9", vec!["a".to_string()], vec![(0, "hi".to_string())])
            .into();
    assert!(check_input(&valid).is_ok());
}

struct MapProvider {
    sources: HashMap<String, RawSource>,
}

#[async_trait]
impl SourceProvider for MapProvider {
    async fn fetch(&self, guid: &str) -> TaglinkResult<RawSource> {
        match self.sources.get(guid) {
            Some(raw) => Ok(raw.clone()),
            None => Err(ConfigError::new(format!("no source for {}", guid)).into()),
        }
    }
}

#[tokio::test]
async fn load_fetches_through_provider() {
    let provider = MapProvider {
        sources: HashMap::from([("convo-1".to_string(), raw_conversation())]),
    };

    let input = load(&provider, "convo-1", InputKind::Conversation)
        .await
        .unwrap();
    assert_eq!(input.guid(), "convo-1");

    let err = load(&provider, "missing", InputKind::Conversation)
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ShapeErrorKind::SourceUnavailable { ref guid, .. } if guid == "missing"
    ));
}
