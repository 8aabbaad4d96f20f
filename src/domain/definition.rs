// src/domain/definition.rs
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// One grammatical grouping of a note's definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseGroup {
    pub tags: Vec<String>,
    pub definitions: Vec<String>,
}

/// Decode the `def` field payload.
///
/// The field stores JSON shaped as `[[[tag, ...], [definition, ...]], ...]` with its
/// backslashes doubled, so `\\` is collapsed to `\` before decoding. A blank payload
/// has no sense groups; anything else that does not match the shape is an error.
///
/// # Examples
///
/// ```
/// use ankirubi::domain::parse_definition;
///
/// let groups = parse_definition(r#"[[["v5s"],["to speak","to talk"]]]"#).unwrap();
/// assert_eq!(groups[0].tags, vec!["v5s"]);
/// assert_eq!(groups[0].definitions, vec!["to speak", "to talk"]);
/// ```
pub fn parse_definition(raw: &str) -> Result<Vec<SenseGroup>, DomainError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let unescaped = raw.replace("\\\\", "\\");
    let groups: Vec<(Vec<String>, Vec<String>)> = serde_json::from_str(&unescaped)
        .map_err(|e| DomainError::MalformedDefinition(e.to_string()))?;

    Ok(groups
        .into_iter()
        .map(|(tags, definitions)| SenseGroup { tags, definitions })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_single_group_when_parsing_then_returns_tags_and_definitions() {
        let groups = parse_definition(r#"[[["v5s"],["to speak"]]]"#).unwrap();

        assert_eq!(
            groups,
            vec![SenseGroup {
                tags: vec!["v5s".to_string()],
                definitions: vec!["to speak".to_string()],
            }]
        );
    }

    #[test]
    fn given_multiple_groups_when_parsing_then_preserves_order() {
        let raw = r#"[[["v5s","vt"],["to speak","to talk"]],[[],["to tell"]]]"#;

        let groups = parse_definition(raw).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tags, vec!["v5s", "vt"]);
        assert_eq!(groups[0].definitions, vec!["to speak", "to talk"]);
        assert!(groups[1].tags.is_empty());
        assert_eq!(groups[1].definitions, vec!["to tell"]);
    }

    #[test]
    fn given_doubled_backslashes_when_parsing_then_collapses_them() {
        // Field text as stored: [[["n"],["a \\"quoted\\" word"]]]
        let raw = r#"[[["n"],["a \\"quoted\\" word"]]]"#;

        let groups = parse_definition(raw).unwrap();

        assert_eq!(groups[0].definitions, vec![r#"a "quoted" word"#]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn given_blank_payload_when_parsing_then_returns_no_groups(#[case] raw: &str) {
        assert_eq!(parse_definition(raw).unwrap(), vec![]);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"tags":[],"definitions":[]}"#)]
    #[case(r#"[["v5s","to speak"]]"#)]
    #[case(r#"[[["v5s"],[1]]]"#)]
    #[case(r#"[[["v5s"]]]"#)]
    fn given_malformed_payload_when_parsing_then_returns_error(#[case] raw: &str) {
        let result = parse_definition(raw);

        assert!(matches!(result, Err(DomainError::MalformedDefinition(_))));
    }
}
