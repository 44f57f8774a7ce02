//! Bibliographic record extracted from a paper
//!
//! The model's JSON is never trusted as the record type directly: it is parsed
//! into a generic map and each known key is projected with coercion and a
//! default, so a missing or mistyped field becomes `""` / `false`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON keys of a record, in export column order
pub const RECORD_FIELDS: [&str; 12] = [
    "doi",
    "title",
    "author",
    "publicationTitle",
    "publicationDate",
    "url",
    "keywords",
    "abstract",
    "publisher",
    "fieldOfStudy",
    "isDataFusionPaper",
    "dataFusionClassificationReason",
];

/// Separator used when the model returns a list for a delimited field
const LIST_SEPARATOR: &str = "; ";

/// The twelve-field metadata record, also the shape that gets persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedRecord {
    pub doi: String,
    pub title: String,
    /// Semicolon-delimited author names
    pub author: String,
    pub publication_title: String,
    /// `YYYY-MM-DD` or `YYYY`, not validated
    pub publication_date: String,
    pub url: String,
    /// Semicolon-delimited keywords
    pub keywords: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub publisher: String,
    pub field_of_study: String,
    pub is_data_fusion_paper: bool,
    pub data_fusion_classification_reason: String,
}

impl ExtractedRecord {
    /// Project a loosely typed JSON object onto the record.
    ///
    /// Unknown keys are dropped. String fields accept strings, numbers and
    /// booleans (as text) and arrays (joined with `"; "`); anything else,
    /// including `null`, becomes `""`.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let text = |key: &str| coerce_string(map.get(key));

        Self {
            doi: text("doi"),
            title: text("title"),
            author: text("author"),
            publication_title: text("publicationTitle"),
            publication_date: text("publicationDate"),
            url: text("url"),
            keywords: text("keywords"),
            abstract_text: text("abstract"),
            publisher: text("publisher"),
            field_of_study: text("fieldOfStudy"),
            is_data_fusion_paper: coerce_bool(map.get("isDataFusionPaper")),
            data_fusion_classification_reason: text("dataFusionClassificationReason"),
        }
    }

    /// Number of fields the source actually populated (non-empty / true)
    pub fn populated_fields(&self) -> usize {
        let strings = [
            &self.doi,
            &self.title,
            &self.author,
            &self.publication_title,
            &self.publication_date,
            &self.url,
            &self.keywords,
            &self.abstract_text,
            &self.publisher,
            &self.field_of_study,
            &self.data_fusion_classification_reason,
        ];

        strings.iter().filter(|s| !s.is_empty()).count() + usize::from(self.is_data_fusion_paper)
    }
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| coerce_string(Some(item)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        Some(Value::Null) | Some(Value::Object(_)) | None => String::new(),
    }
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}
