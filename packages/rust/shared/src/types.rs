//! Core domain types: extraction records, corpus content, keywords, and slides.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Document statuses that make a record eligible for synthesis.
pub const SUCCESS_STATUSES: [&str; 3] = ["completed", "success", "succeeded"];

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

// Extraction output comes from external tools with loose typing. A field of
// the wrong shape is treated as absent instead of failing the whole record.

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Which acquisition collaborator produced a raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Web scraping output (`web_page` records).
    Web,
    /// PDF/OCR processing output (`pdf_document` records).
    Documents,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Documents => "documents",
        }
    }
}

// ---------------------------------------------------------------------------
// ExtractionRecord
// ---------------------------------------------------------------------------

/// Structured payload of a scraped web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebContent {
    #[serde(default, deserialize_with = "lenient")]
    pub full_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub headings: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub paragraphs: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub lists: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub tables: Vec<Value>,
}

/// One scraped web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebPage {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub content: WebContent,
}

impl WebPage {
    /// Extractable body text (empty when absent).
    pub fn body(&self) -> &str {
        self.content.full_text.as_deref().unwrap_or_default()
    }
}

/// File-level metadata reported by the document extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub size_bytes: Option<u64>,
    /// Any other keys (author, producer, ...), retained verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One processed PDF (or OCR'd image) document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub metadata: DocumentMetadata,
    #[serde(default, deserialize_with = "lenient")]
    pub page_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ocr_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub tables: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub images: Vec<Value>,
}

impl PdfDocument {
    /// Whether the record may take part in synthesis.
    ///
    /// A missing status is accepted; a present one must be in [`SUCCESS_STATUSES`].
    pub fn is_eligible(&self) -> bool {
        match &self.status {
            None => true,
            Some(status) => SUCCESS_STATUSES.contains(&status.as_str()),
        }
    }

    /// Non-blank `text` and `ocr_text`, trimmed and newline-joined.
    pub fn body(&self) -> String {
        [self.text.as_deref(), self.ocr_text.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `metadata.filename`, else the basename of `file`.
    pub fn display_title(&self) -> Option<String> {
        if let Some(name) = self.metadata.filename.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        self.file
            .as_deref()
            .and_then(|f| f.rsplit(['/', '\\']).next())
            .filter(|name| !name.is_empty())
            .map(String::from)
    }

    /// Image count: an object entry with an integer `count` contributes that
    /// value, every other entry contributes 1.
    pub fn image_count(&self) -> u64 {
        self.images
            .iter()
            .map(|entry| entry.get("count").and_then(Value::as_u64).unwrap_or(1))
            .sum()
    }
}

/// One unit of externally supplied content, decoded once at the
/// aggregation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionRecord {
    WebPage(WebPage),
    PdfDocument(PdfDocument),
}

// ---------------------------------------------------------------------------
// Corpus content
// ---------------------------------------------------------------------------

/// Retained structure of an accepted web page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebPageItem {
    /// Raw source the record came from.
    pub origin: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub headings: Vec<Value>,
    pub paragraphs: Vec<Value>,
    pub lists: Vec<Value>,
    pub tables: Vec<Value>,
    pub text: String,
}

/// Retained structure of an accepted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Raw source the record came from.
    pub origin: String,
    pub title: Option<String>,
    pub file: Option<String>,
    pub filename: Option<String>,
    pub size_bytes: Option<u64>,
    pub page_count: Option<u64>,
    pub table_count: usize,
    pub image_count: u64,
    pub text: String,
    pub status: Option<String>,
}

/// Caller-supplied stand-in content used when nothing was acquired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleItem {
    pub title: String,
    pub content: String,
}

/// One entry of `content_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    WebPage(WebPageItem),
    PdfDocument(DocumentItem),
    Sample(SampleItem),
}

/// A document record skipped because of its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedRecord {
    pub origin: String,
    pub file: Option<String>,
    pub status: String,
}

/// Aggregate figures over accepted documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub documents: usize,
    pub pages: u64,
    pub text_chars: usize,
    pub tables: usize,
    pub images: u64,
}

impl DocumentStats {
    /// Sum over documents. Order-independent.
    pub fn from_documents<'a>(docs: impl IntoIterator<Item = &'a DocumentItem>) -> Self {
        docs.into_iter().fold(Self::default(), |mut acc, doc| {
            acc.documents += 1;
            acc.pages += doc.page_count.unwrap_or(0);
            acc.text_chars += doc.text.chars().count();
            acc.tables += doc.table_count;
            acc.images += doc.image_count;
            acc
        })
    }
}

/// Merged content of one pipeline run. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    /// Accepted records, in acceptance order.
    pub items: Vec<ContentItem>,
    /// Body text of all accepted records, each followed by a newline.
    pub text: String,
    /// Externally supplied document summary pairs, in source order.
    pub summary: Vec<(String, String)>,
    /// Records skipped for an unsupported status.
    pub excluded: Vec<ExcludedRecord>,
    /// Origins of sources that could not be read.
    pub unavailable: Vec<String>,
}

impl Corpus {
    /// Sample corpus used when a caller opts into fallback content.
    pub fn sample() -> Self {
        Self {
            items: vec![ContentItem::Sample(SampleItem {
                title: "Sample Data".into(),
                content: "This is a sample presentation generated without input data.".into(),
            })],
            text: "Sample content for presentation generation demonstration.".into(),
            ..Self::default()
        }
    }

    /// True when there is neither text nor structured content.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.text.trim().is_empty()
    }

    /// Character length of the text buffer.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentItem> {
        self.items.iter().filter_map(|item| match item {
            ContentItem::PdfDocument(doc) => Some(doc),
            _ => None,
        })
    }

    pub fn web_pages(&self) -> impl Iterator<Item = &WebPageItem> {
        self.items.iter().filter_map(|item| match item {
            ContentItem::WebPage(page) => Some(page),
            _ => None,
        })
    }

    pub fn document_stats(&self) -> DocumentStats {
        DocumentStats::from_documents(self.documents())
    }
}

// ---------------------------------------------------------------------------
// KeywordProfile
// ---------------------------------------------------------------------------

/// One ranked keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub token: String,
    pub count: usize,
}

/// Keywords ranked by descending frequency; ties keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordProfile(pub Vec<Keyword>);

impl KeywordProfile {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.0.iter()
    }

    /// Tokens only, in rank order.
    pub fn tokens(&self) -> Vec<&str> {
        self.0.iter().map(|k| k.token.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Label language for user-visible slide text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    En,
    #[default]
    Ja,
}

impl Language {
    /// Parse a language code. Unsupported codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ja" | "jp" | "ja-jp" => Self::Ja,
            _ => Self::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// SlideSpec
// ---------------------------------------------------------------------------

/// One planned slide, prior to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideSpec {
    Title { title: String, subtitle: String },
    Overview { title: String, content: Vec<String> },
    Content { title: String, content: Vec<String> },
}

impl SlideSpec {
    pub fn title(&self) -> &str {
        match self {
            Self::Title { title, .. } | Self::Overview { title, .. } | Self::Content { title, .. } => {
                title
            }
        }
    }

    /// Content lines (empty for title slides).
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Title { .. } => &[],
            Self::Overview { content, .. } | Self::Content { content, .. } => content,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Title { .. } => "title",
            Self::Overview { .. } => "overview",
            Self::Content { .. } => "content",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_decodes_with_ill_typed_fields() {
        let doc: PdfDocument = serde_json::from_value(json!({
            "file": "in/report.pdf",
            "status": "completed",
            "page_count": "five",
            "tables": {"not": "a list"},
            "metadata": {"filename": "report.pdf", "size_bytes": 2048, "author": "ops"}
        }))
        .expect("decode");
        assert_eq!(doc.page_count, None);
        assert!(doc.tables.is_empty());
        assert_eq!(doc.metadata.size_bytes, Some(2048));
        assert_eq!(doc.metadata.extra.get("author"), Some(&json!("ops")));
    }

    #[test]
    fn eligibility_follows_success_set() {
        let mut doc = PdfDocument::default();
        assert!(doc.is_eligible());
        for ok in SUCCESS_STATUSES {
            doc.status = Some(ok.into());
            assert!(doc.is_eligible());
        }
        doc.status = Some("error".into());
        assert!(!doc.is_eligible());
    }

    #[test]
    fn body_joins_text_and_ocr() {
        let doc = PdfDocument {
            text: Some("  native text \n".into()),
            ocr_text: Some("ocr text".into()),
            ..Default::default()
        };
        assert_eq!(doc.body(), "native text\nocr text");

        let blank = PdfDocument {
            text: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.body(), "");
    }

    #[test]
    fn display_title_prefers_metadata_filename() {
        let mut doc = PdfDocument {
            file: Some("/tmp/uploads/q3.pdf".into()),
            ..Default::default()
        };
        assert_eq!(doc.display_title().as_deref(), Some("q3.pdf"));
        doc.metadata.filename = Some("Q3 Report.pdf".into());
        assert_eq!(doc.display_title().as_deref(), Some("Q3 Report.pdf"));
    }

    #[test]
    fn image_count_uses_count_field_or_one() {
        let doc = PdfDocument {
            images: vec![
                json!({"page": 1, "count": 3}),
                json!({"image_index": 0}),
                json!("raw-entry"),
                json!({"count": "many"}),
            ],
            ..Default::default()
        };
        assert_eq!(doc.image_count(), 6);
    }

    #[test]
    fn stats_are_order_independent() {
        let a = DocumentItem {
            page_count: Some(5),
            table_count: 2,
            image_count: 1,
            text: "abc".into(),
            ..Default::default()
        };
        let b = DocumentItem {
            page_count: None,
            table_count: 1,
            image_count: 4,
            text: "日本語".into(),
            ..Default::default()
        };
        let forward = DocumentStats::from_documents([&a, &b]);
        let backward = DocumentStats::from_documents([&b, &a]);
        assert_eq!(forward, backward);
        assert_eq!(forward.pages, 5);
        assert_eq!(forward.text_chars, 6);
        assert_eq!(forward.tables, 3);
        assert_eq!(forward.images, 5);
    }

    #[test]
    fn language_falls_back_to_english() {
        assert_eq!(Language::from_code("ja"), Language::Ja);
        assert_eq!(Language::from_code("EN"), Language::En);
        assert_eq!(Language::from_code("fr"), Language::En);
        let parsed: Language = serde_json::from_value(json!("de")).expect("decode");
        assert_eq!(parsed, Language::En);
        assert_eq!(Language::default(), Language::Ja);
    }

    #[test]
    fn slide_spec_serializes_tagged() {
        let slide = SlideSpec::Content {
            title: "Overview".into(),
            content: vec!["line".into()],
        };
        let value = serde_json::to_value(&slide).expect("serialize");
        assert_eq!(value["type"], "content");
        assert_eq!(value["content"][0], "line");

        let title = SlideSpec::Title {
            title: "Deck".into(),
            subtitle: "Task ID: x".into(),
        };
        assert!(title.lines().is_empty());
        assert_eq!(title.kind(), "title");
    }

    #[test]
    fn sample_corpus_is_not_empty() {
        assert!(!Corpus::sample().is_empty());
        assert!(Corpus::default().is_empty());
    }
}
