//! Decode boundary for raw extraction output.
//!
//! Collaborators emit JSON in several shapes: a bare list of records, an
//! object with a `results` or `documents` list, or a single record object.
//! This module sniffs the shape once and yields canonical
//! [`ExtractionRecord`]s so nothing downstream branches on raw JSON again.

use serde_json::Value;
use tracing::{debug, warn};

use slidepipe_shared::{ExtractionRecord, PdfDocument, SourceKind, WebPage};

/// Raw payload handed over by an acquisition collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSource {
    pub kind: SourceKind,
    /// Where the payload came from (file path, URL, collaborator name).
    pub origin: String,
    /// The JSON payload, or the reason it could not be obtained.
    pub payload: std::result::Result<Value, String>,
}

impl RawSource {
    pub fn new(kind: SourceKind, origin: impl Into<String>, payload: Value) -> Self {
        Self {
            kind,
            origin: origin.into(),
            payload: Ok(payload),
        }
    }

    pub fn unavailable(kind: SourceKind, origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            origin: origin.into(),
            payload: Err(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.payload.is_ok()
    }
}

/// Canonical content of one raw source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSource {
    pub records: Vec<ExtractionRecord>,
    /// `summary` pairs carried by a document payload, in source order.
    pub summary: Vec<(String, String)>,
    /// Non-object entries that could not be records at all.
    pub dropped: usize,
}

/// Decode a payload produced by the collaborator of `kind`.
pub fn decode_source(kind: SourceKind, payload: &Value) -> DecodedSource {
    let mut decoded = DecodedSource::default();

    if kind == SourceKind::Documents {
        if let Some(summary) = payload.get("summary").and_then(Value::as_object) {
            decoded.summary = summary
                .iter()
                .map(|(key, value)| (key.clone(), render_value(value)))
                .collect();
        }
    }

    for entry in record_entries(payload) {
        if !entry.is_object() {
            warn!(kind = kind.as_str(), "dropping non-object record entry");
            decoded.dropped += 1;
            continue;
        }
        decoded.records.push(decode_record(kind, entry));
    }

    debug!(
        kind = kind.as_str(),
        records = decoded.records.len(),
        dropped = decoded.dropped,
        summary_pairs = decoded.summary.len(),
        "decoded source"
    );

    decoded
}

/// Locate the record list inside a payload.
fn record_entries(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => {
            for key in ["results", "documents"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    return items;
                }
            }
            // A `summary` key marks a batch wrapper, never a record.
            if map.contains_key("summary") {
                debug!("wrapper object without a record list");
                return &[];
            }
            std::slice::from_ref(payload)
        }
        _ => {
            warn!("payload is neither a list nor an object, ignoring");
            &[]
        }
    }
}

fn decode_record(kind: SourceKind, entry: &Value) -> ExtractionRecord {
    // Record fields decode leniently, so only a structural surprise lands
    // in the error arms; fall back to an empty placeholder there.
    match kind {
        SourceKind::Web => match serde_json::from_value::<WebPage>(entry.clone()) {
            Ok(page) => ExtractionRecord::WebPage(page),
            Err(e) => {
                debug!(error = %e, "web record decoded as placeholder");
                ExtractionRecord::WebPage(WebPage::default())
            }
        },
        SourceKind::Documents => match serde_json::from_value::<PdfDocument>(entry.clone()) {
            Ok(doc) => ExtractionRecord::PdfDocument(doc),
            Err(e) => {
                debug!(error = %e, "document record decoded as placeholder");
                ExtractionRecord::PdfDocument(PdfDocument::default())
            }
        },
    }
}

/// Plain text for scalars, compact JSON for everything else.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
