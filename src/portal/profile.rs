//! Profile page: uploaded-document deletion, authorized-signatory sub-forms
//! and the completion progress bar.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::{csrf, PortalClient, PortalError, Role};
use crate::logging::log_portal_call;

pub const MAX_SIGNATORIES: usize = 4;
pub const SIGNATORY_LIMIT_MESSAGE: &str = "Maximum 4 authorized signatories allowed.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete file.";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{}", .0.as_deref().unwrap_or(DELETE_FAILED_MESSAGE))]
    DeleteRejected(Option<String>),

    #[error("no uploaded file for field {0}")]
    UnknownField(String),

    #[error(transparent)]
    Portal(#[from] PortalError),
}

// =============================================================================
// Uploaded documents
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Model field name the server knows the file by, e.g. `pan_card`.
    pub field: String,
    pub file_name: String,
}

/// Files currently listed on the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFiles {
    files: Vec<UploadedFile>,
}

impl UploadedFiles {
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn contains(&self, field: &str) -> bool {
        self.files.iter().any(|f| f.field == field)
    }

    fn remove(&mut self, field: &str) {
        self.files.retain(|f| f.field != field);
    }
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl PortalClient {
    /// Asks the profile endpoint to drop the file stored in `field`. The entry
    /// leaves `files` only when the server confirms; on any failure the list
    /// is untouched.
    pub async fn delete_file(
        &self,
        role: Role,
        files: &mut UploadedFiles,
        field: &str,
        form_token: Option<&str>,
    ) -> Result<(), ProfileError> {
        if !files.contains(field) {
            return Err(ProfileError::UnknownField(field.to_string()));
        }
        let mut url: Url = self.role_url(role, "profile/")?;
        url.query_pairs_mut()
            .append_pair("delete_file", "1")
            .append_pair("field", field);
        let token = form_token
            .map(str::to_string)
            .or_else(|| self.csrf_token())
            .unwrap_or_default();

        let resp = self
            .http()
            .post(url.clone())
            .header(csrf::HEADER, token)
            .send()
            .await
            .map_err(Self::transport(&url))?;
        let data: DeleteResponse = resp.json().await.map_err(Self::transport(&url))?;

        log_portal_call(role.slug(), url.as_str(), data.success, data.error.as_deref());
        if data.success {
            files.remove(field);
            Ok(())
        } else {
            Err(ProfileError::DeleteRejected(data.error))
        }
    }
}

// =============================================================================
// Authorized signatories
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatoryCard {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pan: String,
}

/// New signatory cards added on the broker profile. Existing signatories
/// count toward the same limit of four.
#[derive(Debug, Clone, Default)]
pub struct SignatoryForms {
    existing: usize,
    cards: Vec<SignatoryCard>,
}

impl SignatoryForms {
    pub fn with_existing(existing: usize) -> Self {
        Self {
            existing,
            cards: Vec::new(),
        }
    }

    pub fn cards(&self) -> &[SignatoryCard] {
        &self.cards
    }

    pub fn remaining(&self) -> usize {
        MAX_SIGNATORIES.saturating_sub(self.existing + self.cards.len())
    }

    /// Appends a blank card from the template, refusing past the limit.
    pub fn add(&mut self) -> Result<&mut SignatoryCard, PortalError> {
        if self.remaining() == 0 {
            return Err(PortalError::Validation(SIGNATORY_LIMIT_MESSAGE.to_string()));
        }
        self.cards.push(SignatoryCard::default());
        let last = self.cards.len() - 1;
        Ok(&mut self.cards[last])
    }

    pub fn remove(&mut self, index: usize) -> Option<SignatoryCard> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    /// Multipart field pairs in the `auth_signatory_*[]` layout the profile
    /// form posts. PAN numbers are upper-cased.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.cards.len() * 4);
        for card in &self.cards {
            out.push(("auth_signatory_name[]".to_string(), card.name.trim().to_string()));
            out.push(("auth_signatory_email[]".to_string(), card.email.trim().to_string()));
            out.push(("auth_signatory_phone[]".to_string(), card.phone.trim().to_string()));
            out.push(("auth_signatory_pan[]".to_string(), card.pan.trim().to_uppercase()));
        }
        out
    }
}

// =============================================================================
// Progress bar
// =============================================================================

pub const REVEAL_DELAY: Duration = Duration::from_millis(150);

/// Completion bar that starts empty and animates to its final width once
/// the reveal delay has passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReveal {
    target_pct: f64,
}

impl ProgressReveal {
    pub fn new(target_pct: f64) -> Self {
        Self {
            target_pct: target_pct.clamp(0.0, 100.0),
        }
    }

    /// Reads the `--pct` style value, e.g. `"72%"`.
    pub fn from_style(value: &str) -> Option<Self> {
        let raw = value.trim().trim_end_matches('%').trim();
        raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(Self::new)
    }

    pub fn pct_at(&self, elapsed: Duration) -> f64 {
        if elapsed < REVEAL_DELAY {
            0.0
        } else {
            self.target_pct
        }
    }

    pub fn style_at(&self, elapsed: Duration) -> String {
        format!("{}%", self.pct_at(elapsed))
    }
}
