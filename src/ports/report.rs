// src/ports/report.rs
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::domain::Note;
use crate::infrastructure::config::TagStyle;
use crate::util::text::to_plain_text;

/// Plain-text rendering of a single note for non-interactive output.
///
/// ```text
/// 話す (はなす)
///   [godan verb] to speak; to talk
/// ```
pub fn format_note(note: &Note, tags: &BTreeMap<String, TagStyle>) -> String {
    let word = to_plain_text(&note.word);
    let rubi = to_plain_text(&note.rubi);
    let mut out = if rubi.is_empty() {
        format!("{word}\n")
    } else {
        format!("{word} ({rubi})\n")
    };

    match note.sense_groups() {
        Ok(groups) => {
            for group in groups {
                let labels: Vec<String> = group
                    .tags
                    .iter()
                    .map(|code| {
                        let label = tags.get(code).map_or(code.as_str(), |s| s.label.as_str());
                        format!("[{label}] ")
                    })
                    .collect();
                let definitions: Vec<String> =
                    group.definitions.iter().map(|d| to_plain_text(d)).collect();
                let _ = writeln!(out, "  {}{}", labels.concat(), definitions.join("; "));
            }
        }
        Err(err) => {
            let _ = writeln!(out, "  definition unavailable: {err}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> BTreeMap<String, TagStyle> {
        BTreeMap::from([(
            "v5s".to_string(),
            TagStyle {
                label: "godan verb".to_string(),
                color: "cyan".to_string(),
            },
        )])
    }

    fn note(rubi: &str, def: &str) -> Note {
        Note {
            id: "42".to_string(),
            word: "話す".to_string(),
            rubi: rubi.to_string(),
            def: def.to_string(),
        }
    }

    #[test]
    fn given_note_when_formatting_then_lists_word_rubi_and_groups() {
        let note = note("はなす", r#"[[["v5s","vt"],["to speak","to talk"]],[[],["to tell"]]]"#);

        let text = format_note(&note, &tags());

        assert_eq!(
            text,
            "話す (はなす)\n  [godan verb] [vt] to speak; to talk\n  to tell\n"
        );
    }

    #[test]
    fn given_empty_rubi_when_formatting_then_omits_parentheses() {
        let text = format_note(&note("", "[]"), &tags());

        assert_eq!(text, "話す\n");
    }

    #[test]
    fn given_malformed_definition_when_formatting_then_reports_it_inline() {
        let text = format_note(&note("はなす", "oops"), &tags());

        assert!(text.starts_with("話す (はなす)\n"));
        assert!(text.contains("definition unavailable"));
    }
}
