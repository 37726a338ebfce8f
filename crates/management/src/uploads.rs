//! File uploads: storage collaborator, upload targets and in-progress tracking.

use campaign_channels::AssetSlot;
use campaign_core::{CampaignError, CampaignResult};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::{info, warn};
use url::Url;

use crate::requests::{RequestGenerations, RequestToken};

/// Where an uploaded file ends up in the draft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadTarget {
    EmailAsset { slot: AssetSlot },
    RecipientFile,
}

/// A file handed over by the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Trait for file storage backends. Returns a URL the file can be fetched from.
pub trait FileStorage: Send + Sync {
    fn store(&self, file: &UploadedFile) -> CampaignResult<String>;
}

/// Result of completing an upload, as reported back to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Applied { target: UploadTarget, url: String },
    /// A newer upload for the same target was started; this one was dropped.
    Discarded { target: UploadTarget },
    /// Blocking alert for the user. Nothing is retried.
    Failed { target: UploadTarget, alert: String },
}

// ─── In-memory storage ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Content-addressed in-memory file store.
pub struct InMemoryFileStorage {
    base_url: Url,
    max_bytes: usize,
    objects: DashMap<String, StoredObject>,
}

impl InMemoryFileStorage {
    pub fn new(base_url: &str, max_bytes: usize) -> CampaignResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| CampaignError::Config(format!("invalid storage base url '{base_url}': {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        info!(base_url = %base_url, max_bytes, "File storage initialized (in-memory)");
        Ok(Self {
            base_url,
            max_bytes,
            objects: DashMap::new(),
        })
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|o| o.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn object_key(file: &UploadedFile) -> String {
        let digest = hex::encode(Sha256::digest(&file.bytes));
        match file.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
                format!("{digest}.{}", ext.to_ascii_lowercase())
            }
            _ => digest,
        }
    }
}

impl FileStorage for InMemoryFileStorage {
    fn store(&self, file: &UploadedFile) -> CampaignResult<String> {
        if file.bytes.is_empty() {
            return Err(CampaignError::Upload(format!("'{}' is empty", file.file_name)));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(CampaignError::Upload(format!(
                "'{}' is {} bytes, limit is {}",
                file.file_name,
                file.bytes.len(),
                self.max_bytes
            )));
        }

        let key = Self::object_key(file);
        let url = self
            .base_url
            .join(&key)
            .map_err(|e| CampaignError::Upload(format!("cannot build url for '{key}': {e}")))?;

        self.objects.insert(
            key.clone(),
            StoredObject {
                file_name: file.file_name.clone(),
                content_type: file.content_type.clone(),
                bytes: file.bytes.clone(),
            },
        );
        info!(key = %key, size = file.bytes.len(), "File stored");
        Ok(url.to_string())
    }
}

// ─── Upload tracking ────────────────────────────────────────────────────────

/// Per-target in-progress flags plus stale-response detection.
#[derive(Debug, Default)]
pub struct UploadTracker {
    generations: RequestGenerations<UploadTarget>,
    in_progress: BTreeSet<UploadTarget>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, target: UploadTarget) -> RequestToken<UploadTarget> {
        self.in_progress.insert(target);
        self.generations.issue(target)
    }

    /// Close out a request. Returns `false` for a superseded token, in which
    /// case the newer upload keeps the target marked in progress.
    pub fn finish(&mut self, token: &RequestToken<UploadTarget>) -> bool {
        if !self.generations.is_current(token) {
            warn!(upload = ?token.kind, generation = token.generation, "Discarding stale upload response");
            return false;
        }
        self.in_progress.remove(&token.kind);
        true
    }

    pub fn is_in_progress(&self, target: UploadTarget) -> bool {
        self.in_progress.contains(&target)
    }

    pub fn in_progress(&self) -> Vec<UploadTarget> {
        self.in_progress.iter().copied().collect()
    }
}

/// Data rows in an uploaded recipient file: non-blank lines after the header.
pub fn count_recipient_rows(bytes: &[u8]) -> u64 {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .count() as u64
}
