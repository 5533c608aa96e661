//! Uploaded user documents (statements, tax returns, …).
//!
//! Extracted text and AI-derived insights are filled in after upload by the
//! insight bridge, best-effort.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RecordId;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
  Statement,
  TaxReturn,
  Invoice,
  Receipt,
  #[default]
  Other,
}

/// An uploaded artifact owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
  pub id:       RecordId,
  pub owner_id: RecordId,
  pub filename: String,
  pub kind:     DocumentKind,
  pub uploaded_at: DateTime<Utc>,
  /// Extracted text content, if any has been derived yet.
  pub content: Option<String>,
  #[serde(default)]
  pub metadata: Value,
  /// Free-form AI-derived insights.
  pub insights: Option<Value>,
}

/// Input for [`crate::store::FinanceStore::create_document`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
  pub filename: String,
  #[serde(default)]
  pub kind: DocumentKind,
  pub content: Option<String>,
  #[serde(default)]
  pub metadata: Value,
}

/// Merge-update for a document. Absent fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
  pub filename: Option<String>,
  pub kind:     Option<DocumentKind>,
  pub content:  Option<String>,
  pub metadata: Option<Value>,
  pub insights: Option<Value>,
}

impl UserDocument {
  pub fn apply(&mut self, update: DocumentUpdate) {
    if let Some(v) = update.filename {
      self.filename = v;
    }
    if let Some(v) = update.kind {
      self.kind = v;
    }
    if let Some(v) = update.content {
      self.content = Some(v);
    }
    if let Some(v) = update.metadata {
      self.metadata = v;
    }
    if let Some(v) = update.insights {
      self.insights = Some(v);
    }
  }
}
