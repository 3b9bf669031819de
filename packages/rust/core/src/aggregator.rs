//! Content aggregation: raw sources → [`Corpus`].
//!
//! Sources are merged in arrival order, records in payload order. Body text
//! of every accepted record is appended to one buffer, and per-record
//! structure is kept as `content_data` ([`Corpus::items`]).

use tracing::{info, instrument, warn};

use slidepipe_shared::{
    ContentItem, Corpus, DocumentItem, ExcludedRecord, ExtractionRecord, PdfDocument,
    SlidePipeError, WebPage, WebPageItem,
};

use crate::decode::{RawSource, decode_source};

/// Merge raw sources into a corpus.
///
/// Never fails. Unavailable sources contribute nothing, and documents with
/// an unsupported status are excluded; both are logged and recorded on the
/// corpus for audit.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn aggregate(sources: &[RawSource]) -> Corpus {
    let mut corpus = Corpus::default();

    for source in sources {
        let payload = match &source.payload {
            Ok(payload) => payload,
            Err(reason) => {
                let err = SlidePipeError::source_unavailable(&source.origin, reason);
                warn!(error = %err, "skipping unavailable source");
                corpus.unavailable.push(source.origin.clone());
                continue;
            }
        };

        let decoded = decode_source(source.kind, payload);
        corpus.summary.extend(decoded.summary);

        for record in decoded.records {
            accept(&mut corpus, &source.origin, record);
        }
    }

    info!(
        items = corpus.items.len(),
        excluded = corpus.excluded.len(),
        unavailable = corpus.unavailable.len(),
        text_chars = corpus.char_len(),
        "aggregation complete"
    );

    corpus
}

fn accept(corpus: &mut Corpus, origin: &str, record: ExtractionRecord) {
    match record {
        ExtractionRecord::WebPage(page) => {
            let item = web_item(origin, page);
            push_text(corpus, &item.text);
            corpus.items.push(ContentItem::WebPage(item));
        }
        ExtractionRecord::PdfDocument(doc) => {
            if !doc.is_eligible() {
                let status = doc.status.clone().unwrap_or_default();
                let label = doc.file.clone().unwrap_or_else(|| origin.to_string());
                let err = SlidePipeError::unsupported_status(&label, &status);
                warn!(error = %err, "excluding document from synthesis");
                corpus.excluded.push(ExcludedRecord {
                    origin: origin.to_string(),
                    file: doc.file,
                    status,
                });
                return;
            }
            let item = document_item(origin, doc);
            push_text(corpus, &item.text);
            corpus.items.push(ContentItem::PdfDocument(item));
        }
    }
}

fn push_text(corpus: &mut Corpus, body: &str) {
    corpus.text.push_str(body);
    corpus.text.push('\n');
}

fn web_item(origin: &str, page: WebPage) -> WebPageItem {
    let text = page.body().to_string();
    WebPageItem {
        origin: origin.to_string(),
        title: page.title,
        url: page.url,
        headings: page.content.headings,
        paragraphs: page.content.paragraphs,
        lists: page.content.lists,
        tables: page.content.tables,
        text,
    }
}

fn document_item(origin: &str, doc: PdfDocument) -> DocumentItem {
    DocumentItem {
        origin: origin.to_string(),
        title: doc.display_title(),
        text: doc.body(),
        table_count: doc.tables.len(),
        image_count: doc.image_count(),
        filename: doc.metadata.filename,
        size_bytes: doc.metadata.size_bytes,
        page_count: doc.page_count,
        file: doc.file,
        status: doc.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slidepipe_shared::{DocumentStats, SourceKind};

    fn web_source() -> RawSource {
        RawSource::new(
            SourceKind::Web,
            "scraping/detailed_data.json",
            json!([
                {
                    "title": "Release notes",
                    "url": "https://example.com/releases",
                    "content": {
                        "full_text": "Pipeline release notes",
                        "headings": [{"level": "h1", "text": "Releases"}],
                        "tables": [{"headers": ["v"], "rows": [["1.0"]]}]
                    }
                },
                {}
            ]),
        )
    }

    fn pdf_source() -> RawSource {
        RawSource::new(
            SourceKind::Documents,
            "pdf-processing/processing_results.json",
            json!({
                "summary": {"total_files": 3},
                "results": [
                    {
                        "file": "in/q3.pdf",
                        "status": "completed",
                        "metadata": {"filename": "q3.pdf", "size_bytes": 10240},
                        "page_count": 5,
                        "text": "Quarterly figures",
                        "tables": [{}, {}],
                        "images": [{"count": 2}, {"image_index": 1}]
                    },
                    {"file": "in/broken.pdf", "status": "error", "text": "SECRET"},
                    {"file": "in/scan.png", "status": "succeeded", "ocr_text": "scanned words"}
                ]
            }),
        )
    }

    #[test]
    fn text_is_concatenated_in_arrival_order() {
        let corpus = aggregate(&[web_source(), pdf_source()]);
        assert_eq!(
            corpus.text,
            "Pipeline release notes\n\nQuarterly figures\nscanned words\n"
        );
        assert_eq!(corpus.items.len(), 4);
        assert!(matches!(corpus.items[0], ContentItem::WebPage(_)));
        assert!(matches!(corpus.items[2], ContentItem::PdfDocument(_)));
    }

    #[test]
    fn empty_records_become_placeholders() {
        let corpus = aggregate(&[web_source()]);
        match &corpus.items[1] {
            ContentItem::WebPage(page) => {
                assert!(page.title.is_none());
                assert!(page.url.is_none());
                assert_eq!(page.text, "");
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn unsupported_status_is_excluded_but_audited() {
        let corpus = aggregate(&[pdf_source()]);
        assert_eq!(corpus.documents().count(), 2);
        assert_eq!(corpus.excluded.len(), 1);
        assert_eq!(corpus.excluded[0].status, "error");
        assert_eq!(corpus.excluded[0].file.as_deref(), Some("in/broken.pdf"));
        assert!(!corpus.text.contains("SECRET"));
    }

    #[test]
    fn document_aggregates() {
        let corpus = aggregate(&[pdf_source()]);
        assert_eq!(
            corpus.document_stats(),
            DocumentStats {
                documents: 2,
                pages: 5,
                text_chars: "Quarterly figures".len() + "scanned words".len(),
                tables: 2,
                images: 3,
            }
        );
        assert_eq!(corpus.summary, vec![("total_files".into(), "3".into())]);
    }

    #[test]
    fn unavailable_source_is_non_fatal() {
        let sources = vec![
            RawSource::unavailable(SourceKind::Web, "missing.json", "not found"),
            pdf_source(),
        ];
        let corpus = aggregate(&sources);
        assert_eq!(corpus.unavailable, vec!["missing.json".to_string()]);
        assert_eq!(corpus.documents().count(), 2);
    }

    #[test]
    fn no_sources_yield_empty_corpus() {
        let corpus = aggregate(&[]);
        assert!(corpus.is_empty());
        assert_eq!(corpus.char_len(), 0);
    }

    #[test]
    fn summary_only_batch_adds_no_documents() {
        let source = RawSource::new(
            SourceKind::Documents,
            "processing_results.json",
            json!({"summary": {"total_files": 0, "successful": 0}}),
        );
        let corpus = aggregate(&[source]);
        assert_eq!(corpus.documents().count(), 0);
        assert_eq!(corpus.document_stats(), DocumentStats::default());
        assert_eq!(corpus.summary.len(), 2);
    }

    #[test]
    fn missing_status_is_accepted() {
        let source = RawSource::new(
            SourceKind::Documents,
            "docs.json",
            json!([{"file": "a.pdf", "text": "plain"}]),
        );
        let corpus = aggregate(&[source]);
        assert_eq!(corpus.documents().count(), 1);
        assert!(corpus.excluded.is_empty());
    }
}
