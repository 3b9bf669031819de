//! Persistence of run artifacts: the planned deck and the run report.
//!
//! Layout under the output root:
//! ```text
//! <output_dir>/
//! ├── slides/<pipeline_id>/slides.json
//! └── pipelines/<pipeline_id>.json
//! ```
//! Files are written atomically (temp file, then rename).

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use slidepipe_shared::{PipelineRun, Result, SlidePipeError, SlideSpec};

/// Metadata for a written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Write the deck for `pipeline_id`.
#[instrument(skip_all, fields(pipeline_id = %pipeline_id, slides = deck.len()))]
pub fn write_deck(output_dir: &Path, pipeline_id: &str, deck: &[SlideSpec]) -> Result<ArtifactMeta> {
    let dir = output_dir.join("slides").join(pipeline_id);
    let meta = write_json_atomic(&dir.join("slides.json"), deck)?;
    info!(path = %meta.path.display(), "deck written");
    Ok(meta)
}

/// Write the run report for a finished run.
#[instrument(skip_all, fields(pipeline_id = run.pipeline_id()))]
pub fn write_report(output_dir: &Path, run: &PipelineRun) -> Result<ArtifactMeta> {
    let path = output_dir
        .join("pipelines")
        .join(format!("{}.json", run.pipeline_id()));
    let meta = write_json_atomic(&path, run)?;
    info!(path = %meta.path.display(), status = ?run.status(), "run report written");
    Ok(meta)
}

/// Read a run report back from disk.
pub fn read_report(path: &Path) -> Result<PipelineRun> {
    let content = std::fs::read_to_string(path).map_err(|e| SlidePipeError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| SlidePipeError::parse(format!("invalid run report {}: {e}", path.display())))
}

/// Hex SHA-256 of the deck's compact JSON encoding.
pub fn deck_fingerprint(deck: &[SlideSpec]) -> Result<String> {
    let bytes = serde_json::to_vec(deck)
        .map_err(|e| SlidePipeError::validation(format!("JSON serialization failed: {e}")))?;
    Ok(sha256_hex(&bytes))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Pretty-print `data` to `path` via a sibling temp file.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<ArtifactMeta> {
    let json = serde_json::to_string_pretty(data).map_err(|e| {
        SlidePipeError::validation(format!("JSON serialization failed: {e}"))
    })?;

    let parent = path
        .parent()
        .ok_or_else(|| SlidePipeError::validation(format!("no parent for {}", path.display())))?;
    std::fs::create_dir_all(parent).map_err(|e| SlidePipeError::io(parent, e))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = parent.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, &json).map_err(|e| SlidePipeError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| SlidePipeError::io(path, e))?;

    debug!(path = %path.display(), size = json.len(), "wrote JSON file");

    Ok(ArtifactMeta {
        path: path.to_path_buf(),
        sha256: sha256_hex(json.as_bytes()),
        size_bytes: json.len(),
    })
}
