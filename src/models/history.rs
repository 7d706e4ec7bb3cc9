use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of input an analysis was run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Text,
    Image,
    Pdf,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Text => "text",
            AnalysisKind::Image => "image",
            AnalysisKind::Pdf => "pdf",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis request and the model's answer. Never modified after it is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    /// Raw text, or base64 of the uploaded bytes for images.
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_uses_type_key_and_lowercase_kind() {
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            kind: AnalysisKind::Pdf,
            input: "body".into(),
            output: "Probability: 5%".into(),
            filename: Some("mail.pdf".into()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "pdf");
        assert_eq!(value["filename"], "mail.pdf");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_filename_omitted_when_absent() {
        let entry = HistoryEntry {
            timestamp: Utc::now(),
            kind: AnalysisKind::Text,
            input: "hello".into(),
            output: "ok".into(),
            filename: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("filename"));
    }

    #[test]
    fn test_parses_iso_timestamp_without_filename() {
        let json = r#"{"timestamp":"2025-03-01T10:15:00Z","type":"image","input":"aGk=","output":"x"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, AnalysisKind::Image);
        assert!(entry.filename.is_none());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"timestamp":"2025-03-01T10:15:00Z","type":"audio","input":"","output":""}"#;
        assert!(serde_json::from_str::<HistoryEntry>(json).is_err());
    }
}
