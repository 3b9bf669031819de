//! Bilingual label set for user-visible slide text.

use slidepipe_shared::Language;

/// Labels and line formatters for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    lang: Language,
}

impl Labels {
    pub fn new(lang: Language) -> Self {
        Self { lang }
    }

    fn pick(&self, ja: &'static str, en: &'static str) -> &'static str {
        match self.lang {
            Language::Ja => ja,
            Language::En => en,
        }
    }

    // -- titles -------------------------------------------------------------

    pub fn deck_title(&self) -> &'static str {
        self.pick("データ分析結果", "Data Analysis Results")
    }

    pub fn overview_title(&self) -> &'static str {
        self.pick("概要", "Overview")
    }

    pub fn highlights_title(&self) -> &'static str {
        self.pick("PDF分析ハイライト", "PDF Analysis Highlights")
    }

    pub fn summary_title(&self) -> &'static str {
        self.pick("PDFサマリー", "PDF Summary")
    }

    pub fn document_title(&self) -> &'static str {
        self.pick("PDFドキュメント", "PDF Document")
    }

    pub fn web_page_title(&self) -> &'static str {
        self.pick("Webページ", "Web Page")
    }

    pub fn keywords_title(&self) -> &'static str {
        self.pick("主要キーワード", "Top Keywords")
    }

    pub fn no_data_title(&self) -> &'static str {
        self.pick("データなし", "No Data")
    }

    pub fn no_data_subtitle(&self) -> &'static str {
        self.pick(
            "利用可能なコンテンツがありません",
            "No content was available",
        )
    }

    pub fn subtitle(&self, run_label: &str) -> String {
        match self.lang {
            Language::Ja => format!("タスクID: {run_label}"),
            Language::En => format!("Task ID: {run_label}"),
        }
    }

    // -- overview -----------------------------------------------------------

    pub fn sources_line(&self, count: usize) -> String {
        match self.lang {
            Language::Ja => format!("処理されたデータソース: {count}"),
            Language::En => format!("Processed data sources: {count}"),
        }
    }

    pub fn total_chars_line(&self, chars: usize) -> String {
        let chars = group_thousands(chars as u64);
        match self.lang {
            Language::Ja => format!("総文字数: {chars}"),
            Language::En => format!("Total characters: {chars}"),
        }
    }

    pub fn keyword_count_line(&self, count: usize) -> String {
        match self.lang {
            Language::Ja => format!("主要キーワード数: {count}"),
            Language::En => format!("Key keywords: {count}"),
        }
    }

    pub fn documents_overview_line(&self, documents: usize, pages: u64) -> String {
        match self.lang {
            Language::Ja => format!("PDFドキュメント数: {documents} / 総ページ数: {pages}"),
            Language::En => format!("PDF documents: {documents} / Total pages: {pages}"),
        }
    }

    // -- highlights ---------------------------------------------------------

    pub fn processed_documents_line(&self, documents: usize) -> String {
        match self.lang {
            Language::Ja => format!("処理したPDF: {documents}件"),
            Language::En => format!("Processed PDFs: {documents}"),
        }
    }

    pub fn total_pages_line(&self, pages: u64) -> String {
        match self.lang {
            Language::Ja => format!("総ページ数: {pages}"),
            Language::En => format!("Total pages: {pages}"),
        }
    }

    pub fn extracted_chars_line(&self, chars: usize) -> String {
        let chars = group_thousands(chars as u64);
        match self.lang {
            Language::Ja => format!("抽出されたテキスト文字数: {chars}"),
            Language::En => format!("Extracted text characters: {chars}"),
        }
    }

    pub fn extracted_tables_line(&self, tables: usize) -> String {
        match self.lang {
            Language::Ja => format!("抽出されたテーブル数: {tables}"),
            Language::En => format!("Extracted tables: {tables}"),
        }
    }

    pub fn detected_images_line(&self, images: u64) -> String {
        match self.lang {
            Language::Ja => format!("検出された画像数: {images}"),
            Language::En => format!("Detected images: {images}"),
        }
    }

    // -- per item -----------------------------------------------------------

    pub fn filename_line(&self, filename: &str) -> String {
        match self.lang {
            Language::Ja => format!("ファイル名: {filename}"),
            Language::En => format!("Filename: {filename}"),
        }
    }

    pub fn file_size_line(&self, bytes: u64) -> String {
        let bytes = group_thousands(bytes);
        match self.lang {
            Language::Ja => format!("ファイルサイズ: {bytes} バイト"),
            Language::En => format!("File size: {bytes} bytes"),
        }
    }

    pub fn pages_line(&self, pages: u64) -> String {
        match self.lang {
            Language::Ja => format!("ページ数: {pages}"),
            Language::En => format!("Pages: {pages}"),
        }
    }

    pub fn tables_detected_line(&self, tables: usize) -> String {
        match self.lang {
            Language::Ja => format!("テーブル検出数: {tables}"),
            Language::En => format!("Tables detected: {tables}"),
        }
    }

    pub fn url_line(&self, url: &str) -> String {
        format!("URL: {url}")
    }

    pub fn headings_line(&self, headings: usize) -> String {
        match self.lang {
            Language::Ja => format!("見出し数: {headings}"),
            Language::En => format!("Headings: {headings}"),
        }
    }

    pub fn keyword_line(&self, token: &str, count: usize) -> String {
        format!("{token} ({count})")
    }
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
