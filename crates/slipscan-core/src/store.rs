//! Persistence collaborator for reviewed receipts.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::receipt::ExtractedReceipt;
use crate::receipt::round_currency;

/// Records file inside the store root.
pub const RECORDS_FILE: &str = "receipts.jsonl";

/// Image directory inside the store root.
pub const IMAGES_DIR: &str = "images";

/// Receipt image handed over for upload.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    /// Original file name; its extension is kept.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReceiptImage {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: fs::read(path)?,
        })
    }

    fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
    }
}

/// A receipt as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReceipt {
    pub id: Uuid,

    /// Agent who captured the receipt.
    pub agent_id: String,

    pub saved_at: DateTime<Utc>,

    /// Stored image location, relative to the store root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    pub receipt: ExtractedReceipt,
}

/// Accepts a finished receipt plus its image and owning agent.
///
/// Failures are returned to the caller as-is; stores do not retry.
pub trait ReceiptStore {
    fn save(
        &self,
        receipt: &ExtractedReceipt,
        image: Option<&ReceiptImage>,
        agent_id: &str,
    ) -> Result<StoredReceipt, StoreError>;
}

/// Store writing JSON lines and image files under a root directory.
///
/// ```text
/// <root>/receipts.jsonl
/// <root>/images/<agent_id>/<uuid>.<ext>
/// ```
#[derive(Debug, Clone)]
pub struct FileReceiptStore {
    root: PathBuf,
}

impl FileReceiptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn records_path(&self) -> PathBuf {
        self.root.join(RECORDS_FILE)
    }

    /// Read every stored receipt in insertion order.
    pub fn load_all(&self) -> Result<Vec<StoredReceipt>, StoreError> {
        let path = self.records_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| StoreError::Write(format!("{}: {}", path.display(), e)))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| StoreError::Write(format!("corrupt record: {}", e)))
            })
            .collect()
    }

    fn store_image(&self, id: Uuid, agent_id: &str, image: &ReceiptImage) -> Result<PathBuf, StoreError> {
        let relative = PathBuf::from(IMAGES_DIR)
            .join(agent_id)
            .join(format!("{}.{}", id, image.extension()));
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Image(e.to_string()))?;
        }
        fs::write(&target, &image.bytes).map_err(|e| StoreError::Image(e.to_string()))?;

        debug!("Stored receipt image at {}", target.display());
        Ok(relative)
    }
}

impl ReceiptStore for FileReceiptStore {
    fn save(
        &self,
        receipt: &ExtractedReceipt,
        image: Option<&ReceiptImage>,
        agent_id: &str,
    ) -> Result<StoredReceipt, StoreError> {
        let agent_id = agent_id.trim();
        if agent_id.is_empty() {
            return Err(StoreError::Incomplete("agent id is required".to_string()));
        }
        if agent_id.contains(['/', '\\']) || agent_id == ".." || agent_id == "." {
            return Err(StoreError::Incomplete(format!("invalid agent id: {}", agent_id)));
        }

        fs::create_dir_all(&self.root).map_err(|e| StoreError::Write(e.to_string()))?;

        let id = Uuid::new_v4();
        let image_path = image
            .map(|image| self.store_image(id, agent_id, image))
            .transpose()?;

        let mut receipt = receipt.clone();
        receipt.agent_commission = receipt.agent_commission.map(round_currency);

        let stored = StoredReceipt {
            id,
            agent_id: agent_id.to_string(),
            saved_at: Utc::now(),
            image_path,
            receipt,
        };

        let line = serde_json::to_string(&stored).map_err(|e| StoreError::Write(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.records_path())
            .map_err(|e| StoreError::Write(e.to_string()))?;
        writeln!(file, "{}", line).map_err(|e| StoreError::Write(e.to_string()))?;

        info!("Saved receipt {} for agent {}", id, agent_id);
        Ok(stored)
    }
}
