//! Payment-proof image storage on the local filesystem.
//!
//! Files are written once under a generated name
//! `<unix millis>-<random>-<sanitized original name>` and served back
//! under `/uploads/<name>`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tracing::{info, warn};
use wedplan_core::error::{WedplanError, WedplanResult};

/// Content types accepted for payment proofs, with the extension given
/// to a stored file whose original name has none.
const ALLOWED_CONTENT_TYPES: [(&str, &str); 3] = [
    ("image/png", "png"),
    ("image/jpg", "jpg"),
    ("image/jpeg", "jpg"),
];

/// Public URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Largest accepted file, in bytes (default: 5 MiB).
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// A proof written to disk.
#[derive(Debug, Clone)]
pub struct StoredProof {
    pub path: PathBuf,
    /// Relative URL recorded on the order, e.g. `uploads/17...-x.png`.
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct ProofStorage {
    config: UploadConfig,
}

impl ProofStorage {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.config.max_bytes
    }

    /// Validate and persist an uploaded image. Acceptance is decided by
    /// the part's declared content type, not by its file name.
    pub async fn store(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> WedplanResult<StoredProof> {
        let extension = image_extension(content_type)?;
        if bytes.is_empty() {
            return Err(WedplanError::validation("payment proof file is empty"));
        }
        if bytes.len() > self.config.max_bytes {
            return Err(WedplanError::validation(format!(
                "payment proof exceeds {} bytes",
                self.config.max_bytes
            )));
        }

        tokio::fs::create_dir_all(&self.config.dir)
            .await
            .map_err(|e| WedplanError::Storage(format!("create upload dir: {e}")))?;

        let file_name = unique_file_name(original_name, extension);
        let path = self.config.dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| WedplanError::Storage(format!("write {}: {e}", path.display())))?;

        info!(file = %file_name, size = bytes.len(), "Payment proof stored");
        Ok(StoredProof {
            path,
            public_url: format!("{PUBLIC_PREFIX}/{file_name}"),
        })
    }

    /// Delete a stored proof that ended up unused.
    pub async fn discard(&self, proof: &StoredProof) {
        if let Err(e) = tokio::fs::remove_file(&proof.path).await {
            warn!(path = %proof.path.display(), error = %e, "Failed to discard payment proof");
        }
    }
}

fn image_extension(content_type: Option<&str>) -> WedplanResult<&'static str> {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());

    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(mime, _)| essence.as_deref() == Some(*mime))
        .map(|(_, ext)| *ext)
        .ok_or_else(|| WedplanError::validation("only png and jpeg images are allowed"))
}

fn unique_file_name(original_name: &str, extension: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let mut base = sanitize(original_name);
    if base.is_empty() {
        base.push_str("proof");
    }
    if Path::new(&base).extension().is_none() {
        base = format!("{base}.{extension}");
    }
    format!("{millis}-{suffix}-{base}")
}

/// Keep the client's base name readable while making it safe as a path
/// component.
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
