// src/application/protocol.rs
//
// AnkiConnect request and response schemas. Responses are untrusted: every decode
// goes through `decode_result`, which checks the envelope before typing the payload.
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{DecodeError, FetchError};

pub const FIND_NOTES: &str = "findNotes";
pub const NOTES_INFO: &str = "notesInfo";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectRequest {
    pub action: &'static str,
    pub version: u8,
    pub params: Value,
}

impl ConnectRequest {
    pub fn find_notes(query: &str, version: u8) -> Self {
        Self {
            action: FIND_NOTES,
            version,
            params: json!({ "query": query }),
        }
    }

    pub fn notes_info(note_id: i64, version: u8) -> Self {
        Self {
            action: NOTES_INFO,
            version,
            params: json!({ "notes": [note_id] }),
        }
    }
}

/// One record of a `notesInfo` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    pub note_id: i64,
    pub model_name: String,
    pub tags: Vec<String>,
    pub fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldValue {
    pub value: String,
}

impl NoteInfo {
    pub fn field(&self, name: &str) -> Result<&str, DecodeError> {
        self.fields
            .get(name)
            .map(|f| f.value.as_str())
            .ok_or_else(|| {
                DecodeError::new(
                    format!("{NOTES_INFO}.result[0].fields.{name}"),
                    "missing field",
                )
            })
    }
}

/// Unwrap the `{result, error}` envelope and decode `result` as `T`.
///
/// A non-null `error` becomes [`FetchError::Service`]; any shape mismatch becomes
/// [`FetchError::Malformed`] naming the action.
pub fn decode_result<T: DeserializeOwned>(
    action: &'static str,
    response: Value,
) -> Result<T, FetchError> {
    let malformed = |path: String, message: String| FetchError::Malformed {
        action,
        source: DecodeError::new(path, message),
    };

    let mut envelope = match response {
        Value::Object(envelope) => envelope,
        other => {
            return Err(malformed(
                action.to_string(),
                format!("expected an object, found {}", kind_of(&other)),
            ))
        }
    };

    match envelope.remove("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => return Err(FetchError::Service { action, message }),
        Some(other) => {
            return Err(FetchError::Service {
                action,
                message: other.to_string(),
            })
        }
    }

    let result = match envelope.remove("result") {
        None | Some(Value::Null) => {
            return Err(malformed(
                format!("{action}.result"),
                "missing result".to_string(),
            ))
        }
        Some(result) => result,
    };

    serde_json::from_value(result).map_err(|e| malformed(format!("{action}.result"), e.to_string()))
}

/// Decode a `findNotes` response into candidate note ids.
pub fn decode_note_ids(response: Value) -> Result<Vec<i64>, FetchError> {
    decode_result(FIND_NOTES, response)
}

/// Decode a `notesInfo` response that must contain exactly one record.
pub fn decode_single_note_info(response: Value) -> Result<NoteInfo, FetchError> {
    let mut records: Vec<NoteInfo> = decode_result(NOTES_INFO, response)?;
    if records.len() != 1 {
        return Err(FetchError::Malformed {
            action: NOTES_INFO,
            source: DecodeError::new(
                format!("{NOTES_INFO}.result"),
                format!("expected exactly one record, found {}", records.len()),
            ),
        });
    }
    Ok(records.remove(0))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn note_info_json() -> Value {
        json!({
            "result": [{
                "noteId": 42,
                "modelName": "Vocab",
                "tags": ["jlpt5"],
                "fields": {
                    "word": { "value": "話す", "order": 0 },
                    "rubi": { "value": "はなす", "order": 1 },
                    "def": { "value": "[]", "order": 2 }
                }
            }],
            "error": null
        })
    }

    #[test]
    fn given_find_notes_request_when_serializing_then_matches_wire_format() {
        let request = ConnectRequest::find_notes("deck:VocabJP", 6);

        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(
            wire,
            json!({ "action": "findNotes", "version": 6, "params": { "query": "deck:VocabJP" } })
        );
    }

    #[test]
    fn given_notes_info_request_when_serializing_then_wraps_id_in_list() {
        let request = ConnectRequest::notes_info(42, 6);

        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(
            wire,
            json!({ "action": "notesInfo", "version": 6, "params": { "notes": [42] } })
        );
    }

    #[test]
    fn given_integer_list_when_decoding_note_ids_then_returns_ids() {
        let ids = decode_note_ids(json!({ "result": [1, 2, 3], "error": null })).unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[rstest]
    #[case::missing_result(json!({}))]
    #[case::null_result(json!({ "result": null }))]
    #[case::string_result(json!({ "result": "1,2,3" }))]
    #[case::mixed_list(json!({ "result": [1, "2"] }))]
    #[case::float_ids(json!({ "result": [1.5] }))]
    #[case::not_an_object(json!([1, 2, 3]))]
    fn given_malformed_find_notes_when_decoding_then_returns_malformed(#[case] response: Value) {
        let result = decode_note_ids(response);

        assert!(matches!(
            result,
            Err(FetchError::Malformed {
                action: FIND_NOTES,
                ..
            })
        ));
    }

    #[test]
    fn given_error_member_when_decoding_then_returns_service_error() {
        let result =
            decode_note_ids(json!({ "result": null, "error": "collection is not available" }));

        assert_eq!(
            result,
            Err(FetchError::Service {
                action: FIND_NOTES,
                message: "collection is not available".to_string(),
            })
        );
    }

    #[test]
    fn given_single_record_when_decoding_note_info_then_exposes_fields() {
        let info = decode_single_note_info(note_info_json()).unwrap();

        assert_eq!(info.note_id, 42);
        assert_eq!(info.model_name, "Vocab");
        assert_eq!(info.tags, vec!["jlpt5"]);
        assert_eq!(info.field("word").unwrap(), "話す");
        assert_eq!(info.field("rubi").unwrap(), "はなす");
    }

    #[test]
    fn given_missing_field_when_reading_then_reports_path() {
        let info = decode_single_note_info(note_info_json()).unwrap();

        let err = info.field("reading").unwrap_err();

        assert_eq!(err.path, "notesInfo.result[0].fields.reading");
    }

    #[rstest]
    #[case::empty_result(json!({ "result": [] }))]
    #[case::two_records(json!({ "result": [
        { "noteId": 1, "modelName": "M", "tags": [], "fields": {} },
        { "noteId": 2, "modelName": "M", "tags": [], "fields": {} }
    ] }))]
    #[case::empty_record(json!({ "result": [{}] }))]
    #[case::string_note_id(json!({ "result": [
        { "noteId": "1", "modelName": "M", "tags": [], "fields": {} }
    ] }))]
    #[case::non_string_value(json!({ "result": [
        { "noteId": 1, "modelName": "M", "tags": [], "fields": { "word": { "value": 7 } } }
    ] }))]
    #[case::non_string_tag(json!({ "result": [
        { "noteId": 1, "modelName": "M", "tags": [3], "fields": {} }
    ] }))]
    fn given_malformed_notes_info_when_decoding_then_returns_malformed(#[case] response: Value) {
        let result = decode_single_note_info(response);

        assert!(matches!(
            result,
            Err(FetchError::Malformed {
                action: NOTES_INFO,
                ..
            })
        ));
    }
}
