//! Acquisition collaborator seam.
//!
//! Web scraping and PDF/OCR extraction live outside this crate. The
//! orchestrator talks to them through [`Acquirer`]; the bundled
//! [`JsonFileAcquirer`] reads the JSON those tools already wrote to disk.

use std::path::Path;

use tracing::{debug, warn};

use slidepipe_shared::{Result, SlidePipeError, SourceKind};

use crate::decode::RawSource;

/// An external content producer.
pub trait Acquirer: Send + Sync {
    /// Produce raw sources for `targets`.
    ///
    /// A single unreadable target should come back as an unavailable
    /// [`RawSource`]; an `Err` means the collaborator itself failed.
    fn acquire(&self, kind: SourceKind, targets: &[String]) -> Result<Vec<RawSource>>;
}

/// Treats each target as a path to pre-extracted JSON output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileAcquirer;

impl Acquirer for JsonFileAcquirer {
    fn acquire(&self, kind: SourceKind, targets: &[String]) -> Result<Vec<RawSource>> {
        Ok(targets
            .iter()
            .map(|target| load_source(kind, Path::new(target)))
            .collect())
    }
}

/// Read a JSON file as a raw source. Never fails: a missing or unparsable
/// file yields an unavailable source.
pub fn load_source(kind: SourceKind, path: &Path) -> RawSource {
    let origin = path.display().to_string();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let err = SlidePipeError::io(path, e);
            warn!(kind = kind.as_str(), error = %err, "could not read source");
            return RawSource::unavailable(kind, origin, err.to_string());
        }
    };

    match serde_json::from_str(&content) {
        Ok(payload) => {
            debug!(kind = kind.as_str(), %origin, bytes = content.len(), "loaded source");
            RawSource::new(kind, origin, payload)
        }
        Err(e) => {
            let err = SlidePipeError::parse(format!("{origin}: {e}"));
            warn!(kind = kind.as_str(), error = %err, "could not parse source");
            RawSource::unavailable(kind, origin, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "slidepipe-sources-test-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = load_source(SourceKind::Web, Path::new("/nonexistent/slidepipe/data.json"));
        assert!(!source.is_available());
        assert_eq!(source.kind, SourceKind::Web);
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let dir = temp_dir("corrupt");
        let path = dir.join("bad.json");
        std::fs::write(&path, "{ not json").expect("write");
        let source = load_source(SourceKind::Documents, &path);
        let reason = source.payload.unwrap_err();
        assert!(reason.contains("parse error"));
    }

    #[test]
    fn acquirer_keeps_target_order() {
        let dir = temp_dir("order");
        let first = dir.join("first.json");
        std::fs::write(&first, r#"[{"title": "one"}]"#).expect("write");
        let targets = vec![
            first.display().to_string(),
            dir.join("missing.json").display().to_string(),
        ];

        let sources = JsonFileAcquirer
            .acquire(SourceKind::Web, &targets)
            .expect("acquire");
        assert_eq!(sources.len(), 2);
        assert!(sources[0].is_available());
        assert!(!sources[1].is_available());
        assert_eq!(sources[0].origin, targets[0]);
    }
}
