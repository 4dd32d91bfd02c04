//! Wire models for the journal backend.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Response to an audio upload.
///
/// The backend reports failures both as HTTP errors and, for handled
/// exceptions, as a 200 with `status: "error"`; both shapes decode here.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Extracts the transcription, or the server-provided error detail.
    pub fn into_transcription(self) -> Result<String, String> {
        let failed = self.status.as_deref() == Some("error");
        match (failed, self.transcription) {
            (false, Some(text)) => Ok(text.trim().to_string()),
            _ => Err(self
                .message
                .unwrap_or_else(|| "Backend returned no transcription".to_string())),
        }
    }
}

/// Entry creation time as seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
}

/// One recorded-and-transcribed voice note with derived analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub transcription: Option<String>,
    /// JSON-encoded array of tagged events; see [`Entry::events`].
    #[serde(default)]
    pub events_tagged: Option<String>,
}

impl Entry {
    /// Sentiment polarity in roughly [-1,1], zero when unscored.
    pub fn sentiment(&self) -> f64 {
        self.sentiment_score.unwrap_or(0.0)
    }

    pub fn created_at_local(&self) -> Option<DateTime<Local>> {
        let ts = self.created_at?;
        Local.timestamp_opt(ts.seconds, 0).single()
    }

    /// Decodes the JSON-encoded `events_tagged` column.
    ///
    /// Malformed or missing data degrades to an empty list; a broken
    /// entry must not break the timeline.
    pub fn events(&self) -> Vec<TaggedEvent> {
        let Some(raw) = self.events_tagged.as_deref() else {
            return Vec::new();
        };
        match serde_json::from_str(raw) {
            Ok(events) => events,
            Err(e) => {
                tracing::debug!("Ignoring malformed events_tagged: {e}");
                Vec::new()
            }
        }
    }
}

/// A life-event extracted from a transcription.
///
/// Older entries carry plain event names; newer ones carry the
/// structured subject/action/object/time/location record, which is the
/// authoritative shape.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TaggedEvent {
    Name(String),
    Structured(EventDetail),
}

/// Structured event extraction fields.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EventDetail {
    #[serde(default)]
    pub sentence: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
}

impl TaggedEvent {
    /// Short display label for timeline tags.
    pub fn label(&self) -> String {
        match self {
            TaggedEvent::Name(name) => name.clone(),
            TaggedEvent::Structured(detail) => {
                let mut parts: Vec<&str> = Vec::new();
                for field in [&detail.subject, &detail.action, &detail.object] {
                    if let Some(value) = field.as_deref() {
                        parts.push(value);
                    }
                }
                let mut label = parts.join(" ");
                if label.is_empty() {
                    label = detail
                        .sentence
                        .clone()
                        .unwrap_or_else(|| "(event)".to_string());
                }
                let mut context: Vec<String> = Vec::new();
                if !detail.time.is_empty() {
                    context.push(detail.time.join(", "));
                }
                if !detail.location.is_empty() {
                    context.push(detail.location.join(", "));
                }
                if !context.is_empty() {
                    label.push_str(&format!(" [{}]", context.join("; ")));
                }
                label
            }
        }
    }
}

/// Aggregate event view: recurring events and per-event counts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSummary {
    #[serde(default)]
    pub main_events: Vec<String>,
    #[serde(default)]
    pub all_events: BTreeMap<String, u64>,
}

/// Entry ids arrive as strings (document store) or integers (SQL);
/// normalize both to a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_decodes_full_record() {
        let entry: Entry = serde_json::from_str(
            r#"{
                "id": "abc123",
                "created_at": {"seconds": 1700000000},
                "sentiment_score": 0.42,
                "transcription": "Went hiking today",
                "events_tagged": "[\"hiking\"]"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.id, "abc123");
        assert_eq!(entry.created_at, Some(Timestamp { seconds: 1_700_000_000 }));
        assert_eq!(entry.sentiment(), 0.42);
        assert_eq!(entry.events(), vec![TaggedEvent::Name("hiking".into())]);
    }

    #[test]
    fn entry_tolerates_sparse_record() {
        let entry: Entry = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(entry.id, "7");
        assert_eq!(entry.sentiment(), 0.0);
        assert!(entry.created_at_local().is_none());
        assert!(entry.events().is_empty());
    }

    #[test]
    fn malformed_events_degrade_to_empty() {
        for raw in ["not json", "{\"a\": 1}", "[1, 2]"] {
            let entry = Entry {
                id: "x".into(),
                created_at: None,
                sentiment_score: None,
                transcription: None,
                events_tagged: Some(raw.to_string()),
            };
            assert!(entry.events().is_empty(), "raw {raw:?} should be dropped");
        }
    }

    #[test]
    fn structured_events_decode_and_label() {
        let raw = r#"[
            {"subject": "I", "action": "visited", "object": "grandma",
             "time": ["yesterday"], "location": ["Oslo"]},
            "promotion"
        ]"#;
        let entry = Entry {
            id: "x".into(),
            created_at: None,
            sentiment_score: None,
            transcription: None,
            events_tagged: Some(raw.to_string()),
        };
        let events = entry.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label(), "I visited grandma [yesterday; Oslo]");
        assert_eq!(events[1].label(), "promotion");
    }

    #[test]
    fn structured_event_without_triple_falls_back_to_sentence() {
        let event = TaggedEvent::Structured(EventDetail {
            sentence: Some("It rained.".into()),
            ..EventDetail::default()
        });
        assert_eq!(event.label(), "It rained.");
    }

    #[test]
    fn upload_response_success_and_error_shapes() {
        let ok: UploadResponse = serde_json::from_str(
            r#"{"status": "success", "transcription": " hello ", "entry_id": "e1"}"#,
        )
        .unwrap();
        assert_eq!(ok.into_transcription().unwrap(), "hello");

        let err: UploadResponse =
            serde_json::from_str(r#"{"status": "error", "message": "empty file"}"#).unwrap();
        assert_eq!(err.into_transcription().unwrap_err(), "empty file");
    }

    #[test]
    fn event_summary_decodes() {
        let summary: EventSummary = serde_json::from_str(
            r#"{"main_events": ["hiking"], "all_events": {"hiking": 3, "dinner": 1}}"#,
        )
        .unwrap();
        assert_eq!(summary.main_events, vec!["hiking"]);
        assert_eq!(summary.all_events.get("dinner"), Some(&1));
    }
}
