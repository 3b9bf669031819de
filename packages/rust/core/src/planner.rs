//! Slide planning: corpus + keyword profile + budget → ordered [`SlideSpec`]s.
//!
//! Slide order is fixed:
//! 1. Title
//! 2. Overview (budget ≥ 2), with a document line merged in when documents exist
//! 3. Document highlights (documents exist)
//! 4. Document summary (summary pairs supplied)
//! 5. One slide per document, then per web page, while budget remains
//! 6. Top keywords
//!
//! The result never exceeds the budget; title and overview are built first
//! and so are never the slides that get dropped.

use tracing::{debug, instrument};

use slidepipe_shared::{
    Corpus, DocumentItem, KeywordProfile, Language, PlanningConfig, Result, SlidePipeError,
    SlideSpec, WebPageItem,
};

use crate::labels::Labels;

/// Ellipsis marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Keywords listed on the keyword slide.
const KEYWORD_SLIDE_LIMIT: usize = 7;

/// Planner settings for one deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Maximum number of slides.
    pub budget: usize,
    pub language: Language,
    /// Width of per-item body excerpts, ellipsis included.
    pub excerpt_width: usize,
    /// Width beyond which a content line is cut, ellipsis included.
    pub line_truncate_width: usize,
    /// Identifies the run on the title slide.
    pub run_label: String,
}

impl PlanOptions {
    pub fn from_config(config: &PlanningConfig, run_label: impl Into<String>) -> Self {
        Self {
            budget: config.slide_budget,
            language: config.language,
            excerpt_width: config.excerpt_width,
            line_truncate_width: config.line_truncate_width,
            run_label: run_label.into(),
        }
    }
}

/// Turns a corpus into a bounded slide sequence.
#[derive(Debug, Clone)]
pub struct SlidePlanner {
    options: PlanOptions,
    labels: Labels,
}

impl SlidePlanner {
    pub fn new(options: PlanOptions) -> Self {
        let labels = Labels::new(options.language);
        Self { options, labels }
    }

    /// Plan a deck.
    ///
    /// Fails with [`SlidePipeError::Validation`] for a zero budget and with
    /// [`SlidePipeError::NoContentAvailable`] when the corpus holds neither
    /// text nor items. Missing optional fields never fail.
    #[instrument(skip_all, fields(budget = self.options.budget, items = corpus.items.len()))]
    pub fn plan(&self, corpus: &Corpus, profile: &KeywordProfile) -> Result<Vec<SlideSpec>> {
        let budget = self.options.budget;
        if budget == 0 {
            return Err(SlidePipeError::validation("slide budget must be at least 1"));
        }
        if corpus.is_empty() {
            return Err(SlidePipeError::NoContentAvailable);
        }

        let mut slides = Vec::with_capacity(budget);
        slides.push(self.title_slide());

        if budget >= 2 {
            slides.push(self.overview_slide(corpus, profile));
        }

        let stats = corpus.document_stats();
        if stats.documents > 0 && slides.len() < budget {
            slides.push(SlideSpec::Content {
                title: self.labels.highlights_title().to_string(),
                content: self.cut_all(vec![
                    self.labels.processed_documents_line(stats.documents),
                    self.labels.total_pages_line(stats.pages),
                    self.labels.extracted_chars_line(stats.text_chars),
                    self.labels.extracted_tables_line(stats.tables),
                    self.labels.detected_images_line(stats.images),
                ]),
            });
        }

        if !corpus.summary.is_empty() && slides.len() < budget {
            slides.push(SlideSpec::Content {
                title: self.labels.summary_title().to_string(),
                content: corpus
                    .summary
                    .iter()
                    .map(|(key, value)| self.cut(format!("{key}: {value}")))
                    .collect(),
            });
        }

        for doc in corpus.documents() {
            if slides.len() >= budget {
                break;
            }
            if let Some(slide) = self.document_slide(doc) {
                slides.push(slide);
            }
        }

        for page in corpus.web_pages() {
            if slides.len() >= budget {
                break;
            }
            if let Some(slide) = self.web_page_slide(page) {
                slides.push(slide);
            }
        }

        if !profile.is_empty() && slides.len() < budget {
            slides.push(self.keyword_slide(profile));
        }

        slides.truncate(budget);

        debug!(slides = slides.len(), "deck planned");
        Ok(slides)
    }

    /// Single-slide deck used when no content could be planned.
    pub fn placeholder_deck(&self) -> Vec<SlideSpec> {
        vec![SlideSpec::Title {
            title: self.labels.no_data_title().to_string(),
            subtitle: self.labels.no_data_subtitle().to_string(),
        }]
    }

    fn title_slide(&self) -> SlideSpec {
        SlideSpec::Title {
            title: self.labels.deck_title().to_string(),
            subtitle: self.labels.subtitle(&self.options.run_label),
        }
    }

    fn overview_slide(&self, corpus: &Corpus, profile: &KeywordProfile) -> SlideSpec {
        let mut content = vec![
            self.labels.sources_line(corpus.items.len()),
            self.labels.total_chars_line(corpus.char_len()),
            self.labels.keyword_count_line(profile.len()),
        ];

        let stats = corpus.document_stats();
        if stats.documents > 0 {
            content.push(
                self.labels
                    .documents_overview_line(stats.documents, stats.pages),
            );
        }

        SlideSpec::Overview {
            title: self.labels.overview_title().to_string(),
            content: self.cut_all(content),
        }
    }

    /// `None` when the document has no populated field to show.
    fn document_slide(&self, doc: &DocumentItem) -> Option<SlideSpec> {
        let mut content = Vec::new();

        if let Some(filename) = doc.filename.as_deref().filter(|f| !f.is_empty()) {
            content.push(self.cut(self.labels.filename_line(filename)));
        }
        if let Some(bytes) = doc.size_bytes.filter(|&b| b > 0) {
            content.push(self.cut(self.labels.file_size_line(bytes)));
        }
        if let Some(pages) = doc.page_count.filter(|&p| p > 0) {
            content.push(self.cut(self.labels.pages_line(pages)));
        }
        if doc.table_count > 0 {
            content.push(self.cut(self.labels.tables_detected_line(doc.table_count)));
        }
        if let Some(excerpt) = excerpt(&doc.text, self.options.excerpt_width) {
            content.push(excerpt);
        }

        if content.is_empty() {
            debug!(origin = %doc.origin, "document has nothing to show, skipping slide");
            return None;
        }

        Some(SlideSpec::Content {
            title: doc
                .title
                .clone()
                .unwrap_or_else(|| self.labels.document_title().to_string()),
            content,
        })
    }

    /// `None` when the page has no populated field to show.
    fn web_page_slide(&self, page: &WebPageItem) -> Option<SlideSpec> {
        let mut content = Vec::new();

        if let Some(url) = page.url.as_deref().filter(|u| !u.is_empty()) {
            content.push(self.cut(self.labels.url_line(url)));
        }
        if !page.headings.is_empty() {
            content.push(self.cut(self.labels.headings_line(page.headings.len())));
        }
        if !page.tables.is_empty() {
            content.push(self.cut(self.labels.tables_detected_line(page.tables.len())));
        }
        if let Some(excerpt) = excerpt(&page.text, self.options.excerpt_width) {
            content.push(excerpt);
        }

        if content.is_empty() {
            return None;
        }

        Some(SlideSpec::Content {
            title: page
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.labels.web_page_title().to_string()),
            content,
        })
    }

    fn keyword_slide(&self, profile: &KeywordProfile) -> SlideSpec {
        SlideSpec::Content {
            title: self.labels.keywords_title().to_string(),
            content: profile
                .iter()
                .take(KEYWORD_SLIDE_LIMIT)
                .map(|k| self.cut(self.labels.keyword_line(&k.token, k.count)))
                .collect(),
        }
    }

    /// Apply the content-line width. Excerpts are bounded separately and
    /// never pass through here.
    fn cut(&self, line: String) -> String {
        truncate_line(&line, self.options.line_truncate_width)
    }

    fn cut_all(&self, lines: Vec<String>) -> Vec<String> {
        lines.into_iter().map(|line| self.cut(line)).collect()
    }
}

/// Cut `line` to at most `width` characters, replacing the tail with
/// [`ELLIPSIS`] when it is longer.
pub fn truncate_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut out: String = line.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Whitespace-collapsed excerpt bounded at `width` characters.
/// `None` for blank text.
pub fn excerpt(text: &str, width: usize) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(truncate_line(&collapsed, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidepipe_shared::{ContentItem, Keyword};

    fn options(budget: usize, language: Language) -> PlanOptions {
        PlanOptions {
            budget,
            language,
            excerpt_width: 180,
            line_truncate_width: 200,
            run_label: "pipeline_test".into(),
        }
    }

    fn planner(budget: usize) -> SlidePlanner {
        SlidePlanner::new(options(budget, Language::En))
    }

    fn doc(name: &str, pages: u64, text: &str) -> DocumentItem {
        DocumentItem {
            origin: "docs.json".into(),
            title: Some(name.into()),
            file: Some(format!("in/{name}")),
            filename: Some(name.into()),
            size_bytes: Some(2048),
            page_count: Some(pages),
            table_count: 1,
            image_count: 2,
            text: text.into(),
            status: Some("completed".into()),
        }
    }

    fn corpus_with_docs(n: usize) -> Corpus {
        let mut corpus = Corpus::default();
        for i in 0..n {
            let item = doc(&format!("doc{i}.pdf"), 3, "body text");
            corpus.text.push_str(&item.text);
            corpus.text.push('\n');
            corpus.items.push(ContentItem::PdfDocument(item));
        }
        corpus
    }

    fn profile(tokens: &[(&str, usize)]) -> KeywordProfile {
        KeywordProfile(
            tokens
                .iter()
                .map(|(t, c)| Keyword {
                    token: (*t).into(),
                    count: *c,
                })
                .collect(),
        )
    }

    #[test]
    fn budget_bounds_every_deck() {
        let corpus = corpus_with_docs(12);
        let keywords = profile(&[("body", 12), ("text", 12)]);
        for budget in 1..=20 {
            let slides = planner(budget).plan(&corpus, &keywords).expect("plan");
            assert!(slides.len() <= budget, "budget {budget}");
            assert!(!slides.is_empty());
            assert!(matches!(slides[0], SlideSpec::Title { .. }));
        }
    }

    #[test]
    fn budget_one_is_title_only() {
        let slides = planner(1)
            .plan(&corpus_with_docs(3), &KeywordProfile::default())
            .expect("plan");
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title(), "Data Analysis Results");
    }

    #[test]
    fn budget_zero_is_rejected() {
        let err = planner(0)
            .plan(&corpus_with_docs(1), &KeywordProfile::default())
            .unwrap_err();
        assert!(matches!(err, SlidePipeError::Validation { .. }));
    }

    #[test]
    fn empty_corpus_reports_no_content() {
        let err = planner(10)
            .plan(&Corpus::default(), &KeywordProfile::default())
            .unwrap_err();
        assert!(matches!(err, SlidePipeError::NoContentAvailable));
    }

    #[test]
    fn fixed_order_with_documents() {
        let mut corpus = corpus_with_docs(2);
        corpus.summary = vec![("total_files".into(), "3".into())];
        let slides = planner(10)
            .plan(&corpus, &profile(&[("body", 2)]))
            .expect("plan");

        let titles: Vec<&str> = slides.iter().map(SlideSpec::title).collect();
        assert_eq!(
            titles,
            vec![
                "Data Analysis Results",
                "Overview",
                "PDF Analysis Highlights",
                "PDF Summary",
                "doc0.pdf",
                "doc1.pdf",
                "Top Keywords",
            ]
        );
        assert_eq!(slides[3].lines(), &["total_files: 3".to_string()]);
    }

    #[test]
    fn overview_merges_document_line() {
        let slides = planner(2)
            .plan(&corpus_with_docs(2), &profile(&[("body", 2)]))
            .expect("plan");
        assert_eq!(slides.len(), 2);
        assert_eq!(
            slides[1].lines(),
            &[
                "Processed data sources: 2".to_string(),
                "Total characters: 20".to_string(),
                "Key keywords: 1".to_string(),
                "PDF documents: 2 / Total pages: 6".to_string(),
            ]
        );
    }

    #[test]
    fn per_document_slides_fill_remaining_budget() {
        let slides = planner(5)
            .plan(&corpus_with_docs(6), &KeywordProfile::default())
            .expect("plan");
        // title, overview, highlights, doc0, doc1
        assert_eq!(slides.len(), 5);
        assert_eq!(slides[3].title(), "doc0.pdf");
        assert_eq!(slides[4].title(), "doc1.pdf");
    }

    #[test]
    fn document_slide_omits_absent_fields() {
        let mut corpus = Corpus::default();
        corpus.items.push(ContentItem::PdfDocument(DocumentItem {
            origin: "docs.json".into(),
            page_count: Some(4),
            ..DocumentItem::default()
        }));
        corpus.text.push('\n');
        let slides = planner(10)
            .plan(&corpus, &KeywordProfile::default())
            .expect("plan");
        let last = slides.last().expect("slides");
        assert_eq!(last.title(), "PDF Document");
        assert_eq!(last.lines(), &["Pages: 4".to_string()]);
    }

    #[test]
    fn empty_document_is_skipped() {
        let mut corpus = Corpus::default();
        corpus
            .items
            .push(ContentItem::PdfDocument(DocumentItem::default()));
        corpus.text.push('\n');
        let slides = planner(10)
            .plan(&corpus, &KeywordProfile::default())
            .expect("plan");
        // title, overview, highlights; no blank per-document slide
        assert_eq!(slides.len(), 3);
    }

    #[test]
    fn excerpt_is_bounded_at_180() {
        let long = "x".repeat(250);
        let rendered = excerpt(&long, 180).expect("excerpt");
        assert_eq!(rendered.chars().count(), 180);
        assert!(rendered.ends_with(ELLIPSIS));

        let mut corpus = Corpus::default();
        let item = DocumentItem {
            text: long.clone(),
            ..DocumentItem::default()
        };
        corpus.text = long;
        corpus.items.push(ContentItem::PdfDocument(item));
        let slides = planner(10)
            .plan(&corpus, &KeywordProfile::default())
            .expect("plan");
        let doc_slide = slides.last().expect("slides");
        assert_eq!(doc_slide.lines()[0].chars().count(), 180);
    }

    #[test]
    fn excerpt_collapses_whitespace() {
        assert_eq!(
            excerpt("  first\n\nsecond\tthird ", 180).as_deref(),
            Some("first second third")
        );
        assert_eq!(excerpt(" \n ", 180), None);
    }

    #[test]
    fn long_lines_are_cut_to_200() {
        let line = "y".repeat(260);
        let cut = truncate_line(&line, 200);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.starts_with(&"y".repeat(197)));
        assert!(cut.ends_with(ELLIPSIS));
        assert_eq!(truncate_line("short", 200), "short");

        let mut corpus = corpus_with_docs(1);
        corpus.summary = vec![("note".into(), "z".repeat(300))];
        let slides = planner(10)
            .plan(&corpus, &KeywordProfile::default())
            .expect("plan");
        let summary = slides
            .iter()
            .find(|s| s.title() == "PDF Summary")
            .expect("summary slide");
        assert_eq!(summary.lines()[0].chars().count(), 200);
    }

    #[test]
    fn excerpt_width_is_independent_of_line_width() {
        let planner = SlidePlanner::new(PlanOptions {
            excerpt_width: 300,
            line_truncate_width: 200,
            ..options(10, Language::En)
        });
        let long = "w".repeat(400);
        let mut corpus = Corpus::default();
        corpus.text = long.clone();
        corpus.items.push(ContentItem::PdfDocument(DocumentItem {
            filename: Some(format!("{}.pdf", "f".repeat(250))),
            text: long,
            ..DocumentItem::default()
        }));

        let slides = planner
            .plan(&corpus, &KeywordProfile::default())
            .expect("plan");
        let doc_slide = slides.last().expect("slides");
        assert_eq!(doc_slide.lines()[0].chars().count(), 200);
        assert_eq!(doc_slide.lines()[1].chars().count(), 300);
        assert!(doc_slide.lines()[1].ends_with(ELLIPSIS));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let line = "あ".repeat(201);
        let cut = truncate_line(&line, 200);
        assert_eq!(cut.chars().count(), 200);
    }

    #[test]
    fn web_pages_follow_documents() {
        let mut corpus = corpus_with_docs(1);
        corpus.items.push(ContentItem::WebPage(WebPageItem {
            origin: "web.json".into(),
            title: Some("Changelog".into()),
            url: Some("https://example.com/changelog".into()),
            headings: vec![serde_json::json!({"text": "v1"})],
            text: "Changes".into(),
            ..WebPageItem::default()
        }));
        corpus.items.push(ContentItem::WebPage(WebPageItem::default()));
        let slides = planner(10)
            .plan(&corpus, &KeywordProfile::default())
            .expect("plan");
        let web = slides.last().expect("slides");
        assert_eq!(web.title(), "Changelog");
        assert_eq!(
            web.lines(),
            &[
                "URL: https://example.com/changelog".to_string(),
                "Headings: 1".to_string(),
                "Changes".to_string(),
            ]
        );
    }

    #[test]
    fn japanese_labels() {
        let planner = SlidePlanner::new(options(10, Language::Ja));
        let slides = planner
            .plan(&corpus_with_docs(1), &KeywordProfile::default())
            .expect("plan");
        assert_eq!(slides[0].title(), "データ分析結果");
        assert_eq!(slides[1].title(), "概要");
        assert_eq!(slides[2].lines()[0], "処理したPDF: 1件");
    }

    #[test]
    fn planning_is_deterministic() {
        let corpus = corpus_with_docs(4);
        let keywords = profile(&[("body", 4)]);
        let a = serde_json::to_vec(&planner(8).plan(&corpus, &keywords).expect("plan"))
            .expect("serialize");
        let b = serde_json::to_vec(&planner(8).plan(&corpus, &keywords).expect("plan"))
            .expect("serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn placeholder_is_single_slide() {
        let deck = planner(10).placeholder_deck();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck[0].title(), "No Data");
    }
}
