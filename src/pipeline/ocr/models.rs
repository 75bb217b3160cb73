//! Locating and downloading the ocrs detection and recognition models.

use crate::error::CertScanError;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A model file that can be fetched on first use.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub url: &'static str,
    pub filename: &'static str,
    /// Human-readable size for log messages.
    pub size_hint: &'static str,
}

pub const DETECTION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten",
    filename: "text-detection.rten",
    size_hint: "2.5 MB",
};

pub const RECOGNITION_MODEL: ModelSpec = ModelSpec {
    url: "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten",
    filename: "text-recognition.rten",
    size_hint: "10 MB",
};

/// Make sure both ocrs models exist in `model_dir`, downloading any that are missing.
///
/// Downloads go to a `.part` file first and are renamed into place, so an
/// interrupted download never leaves a truncated model behind.
pub async fn ensure_models(model_dir: &Path) -> Result<PathBuf, CertScanError> {
    tokio::fs::create_dir_all(model_dir)
        .await
        .map_err(|e| CertScanError::ModelLoad {
            model: model_dir.display().to_string(),
            detail: e.to_string(),
        })?;

    let client = reqwest::Client::new();
    for spec in [DETECTION_MODEL, RECOGNITION_MODEL] {
        let dest = model_dir.join(spec.filename);
        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            continue;
        }
        info!("Downloading {} (~{})...", spec.filename, spec.size_hint);
        download(&client, &spec, &dest).await?;
        info!("Downloaded {}", spec.filename);
    }
    Ok(model_dir.to_path_buf())
}

async fn download(
    client: &reqwest::Client,
    spec: &ModelSpec,
    dest: &Path,
) -> Result<(), CertScanError> {
    let fail = |detail: String| CertScanError::ModelLoad {
        model: spec.filename.to_string(),
        detail,
    };

    let resp = client
        .get(spec.url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| fail(format!("GET {}: {}", spec.url, e)))?;

    let part = dest.with_extension("rten.part");
    let mut file = tokio::fs::File::create(&part)
        .await
        .map_err(|e| fail(e.to_string()))?;

    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| fail(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| fail(e.to_string()))?;
    }
    file.flush().await.map_err(|e| fail(e.to_string()))?;
    drop(file);

    tokio::fs::rename(&part, dest)
        .await
        .map_err(|e| fail(e.to_string()))
}
