//! Application state: in-memory stores and their access rules.
//!
//! This module owns:
//!   - the option store (one fixed-shape record per question id)
//!   - draft file areas (per-user scratch storage for uploads, metadata only)
//!   - the pending file-saver registry (handle -> draft area)
//!   - the message texts (from TOML or defaults)
//!
//! Store contracts worth keeping in mind:
//!   - an absent draft area counts as zero files (never an error)
//!   - an unknown saver handle is a lookup failure, surfaced, never guessed
//!   - a malformed option record aborts the save before any write

use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_bank_config_from_env, Messages};
use crate::domain::{QuestionOptions, StoredFile};
use crate::seeds::{restore_default_options, seed_questions};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no options record for question {question_id}")]
    MissingOptionsRecord { question_id: u64 },
    #[error("unknown file saver handle {handle}")]
    UnknownSaverHandle { handle: String },
    #[error("unknown draft area {draft_id}")]
    UnknownDraftArea { draft_id: String },
    #[error("invalid options for question {question_id}: {reason}")]
    InvalidOptions { question_id: u64, reason: String },
}

#[derive(Clone)]
pub struct AppState {
    pub options: Arc<RwLock<HashMap<u64, QuestionOptions>>>,
    drafts: Arc<RwLock<HashMap<String, Vec<StoredFile>>>>,
    pending_savers: Arc<RwLock<HashMap<String, String>>>,
    pub messages: Messages,
}

impl AppState {
    /// Build state from env: load config, validate and seed option records.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_bank_config_from_env();
        let messages = cfg_opt
            .as_ref()
            .map(|c| c.messages.clone())
            .unwrap_or_default();

        let mut options = HashMap::<u64, QuestionOptions>::new();

        // Insert config-based questions (if any), skipping malformed entries.
        if let Some(cfg) = &cfg_opt {
            for qc in &cfg.questions {
                let id = qc.id;
                let opts = qc.clone().into_options();
                if let Err(e) = opts.policy() {
                    error!(target: "fileresponse", question_id = id, error = %e, "Skipping bank question: bad attachment policy.");
                    continue;
                }
                options.insert(id, opts);
            }
        }

        // Always insert built-in seeds, but don't overwrite configured ids.
        for (id, opts) in seed_questions() {
            options.entry(id).or_insert(opts);
        }

        info!(target: "fileresponse", questions = options.len(), "Startup option inventory");

        Self {
            options: Arc::new(RwLock::new(options)),
            drafts: Arc::new(RwLock::new(HashMap::new())),
            pending_savers: Arc::new(RwLock::new(HashMap::new())),
            messages,
        }
    }

    /// Read-only access to the option record for a question.
    #[instrument(level = "debug", skip(self), fields(%question_id))]
    pub async fn get_options(&self, question_id: u64) -> Option<QuestionOptions> {
        self.options.read().await.get(&question_id).cloned()
    }

    /// Like `get_options`, but a miss is an error the caller must handle.
    pub async fn require_options(&self, question_id: u64) -> Result<QuestionOptions, StoreError> {
        self.get_options(question_id)
            .await
            .ok_or(StoreError::MissingOptionsRecord { question_id })
    }

    /// Insert or update the option record. Validates the attachment policy
    /// first; nothing is written for a malformed record.
    #[instrument(level = "debug", skip(self, opts), fields(%question_id))]
    pub async fn save_options(
        &self,
        question_id: u64,
        opts: QuestionOptions,
    ) -> Result<(), StoreError> {
        if let Err(e) = opts.policy() {
            return Err(StoreError::InvalidOptions { question_id, reason: e.to_string() });
        }
        self.options.write().await.insert(question_id, opts);
        Ok(())
    }

    /// Delete the option record. Returns whether a record existed.
    #[instrument(level = "debug", skip(self), fields(%question_id))]
    pub async fn delete_options(&self, question_id: u64) -> bool {
        self.options.write().await.remove(&question_id).is_some()
    }

    /// After a restore pass, synthesize default records for restored
    /// questions that still lack one.
    #[instrument(level = "info", skip(self, question_ids))]
    pub async fn ensure_options_after_restore(&self, question_ids: &[u64]) -> usize {
        let mut options = self.options.write().await;
        let mut synthesized = 0;
        for id in question_ids {
            if !options.contains_key(id) {
                options.insert(*id, restore_default_options());
                synthesized += 1;
            }
        }
        if synthesized > 0 {
            warn!(target: "fileresponse", synthesized, "Restore left questions without options; defaults inserted");
        }
        synthesized
    }

    /// Open a fresh draft area and mint its pending saver handle.
    #[instrument(level = "debug", skip(self), fields(%user_id))]
    pub async fn create_draft_area(&self, user_id: u64) -> (String, String) {
        let draft_id = Uuid::new_v4().to_string();
        let saver_handle = Uuid::new_v4().to_string();
        self.drafts.write().await.insert(draft_id.clone(), Vec::new());
        self.pending_savers
            .write()
            .await
            .insert(saver_handle.clone(), draft_id.clone());
        (draft_id, saver_handle)
    }

    /// Record one uploaded file's metadata. The draft area must exist.
    #[instrument(level = "debug", skip(self, file), fields(%draft_id, name = %file.name))]
    pub async fn attach_file(
        &self,
        draft_id: &str,
        file: StoredFile,
    ) -> Result<usize, StoreError> {
        let mut drafts = self.drafts.write().await;
        let area = drafts
            .get_mut(draft_id)
            .ok_or_else(|| StoreError::UnknownDraftArea { draft_id: draft_id.to_string() })?;
        area.push(file);
        Ok(area.len())
    }

    /// List attached files. An absent area lists as empty.
    pub async fn list_files(&self, draft_id: &str) -> Vec<StoredFile> {
        self.drafts.read().await.get(draft_id).cloned().unwrap_or_default()
    }

    /// Count attached files. The storage contract guarantees absent = none,
    /// so a missing area is zero, not an error.
    #[instrument(level = "debug", skip(self), fields(%draft_id))]
    pub async fn count_files(&self, draft_id: &str) -> usize {
        self.drafts.read().await.get(draft_id).map(|v| v.len()).unwrap_or(0)
    }

    /// Resolve a pending saver handle to its draft area.
    pub async fn resolve_saver(&self, handle: &str) -> Result<String, StoreError> {
        self.pending_savers
            .read()
            .await
            .get(handle)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSaverHandle { handle: handle.to_string() })
    }
}
