//! Management domain types: campaign draft, persisted campaigns and the audit log.

use campaign_channels::ChannelContent;
use campaign_core::{CampaignStatus, CampaignType, Channel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::approval::ValidationCategory;
use crate::recipients::{RecipientEntry, RecipientInput, RecipientList};

// ─── Draft ─────────────────────────────────────────────────────────────────

/// Where a campaign's recipients come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecipientSource {
    /// Typed or pasted in the quick-send step.
    ManualEntry,
    Upload { file_name: String, url: String },
    List { list_id: String, name: String },
}

/// The in-progress campaign assembled by the wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    pub cost_center: String,
    pub campaign_type: Option<CampaignType>,
    pub channels: BTreeSet<Channel>,
    pub recipient_source: Option<RecipientSource>,
    pub total_recipient_count: u64,
    pub recipients: RecipientList,
    pub content: BTreeMap<Channel, ChannelContent>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub trigger_event: Option<String>,
}

impl CampaignDraft {
    pub fn is_quick_send(&self) -> bool {
        self.campaign_type == Some(CampaignType::QuickSend)
    }

    /// Status the draft is saved with on submission.
    pub fn status_on_submit(&self) -> CampaignStatus {
        if self.scheduled_date.is_some() {
            CampaignStatus::Scheduled
        } else {
            CampaignStatus::Draft
        }
    }
}

/// Partial-update messages emitted by the wizard steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftUpdate {
    SetType { campaign_type: CampaignType },
    SetName { name: String },
    SetCostCenter { cost_center: String },
    SetChannels { channels: Vec<Channel> },
    ToggleChannel { channel: Channel },
    SetRecipientSource { source: RecipientSource, total_recipient_count: u64 },
    AddRecipient { recipient: RecipientInput },
    BulkPasteRecipients { text: String },
    RemoveRecipient { index: usize },
    SetContent { content: ChannelContent },
    SetSchedule { scheduled_date: DateTime<Utc> },
    ClearSchedule,
    SetTriggerEvent { trigger_event: Option<String> },
    SetValidationToggle { channel: Channel, category: ValidationCategory, enabled: bool },
    ApplySuggestion { suggestion: CampaignSummary },
}

// ─── Persisted campaign ────────────────────────────────────────────────────

/// A draft ready to be handed to the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub cost_center: String,
    pub campaign_type: CampaignType,
    pub channels: Vec<Channel>,
    pub recipient_source: Option<RecipientSource>,
    pub total_recipient_count: u64,
    pub recipients: Vec<RecipientEntry>,
    pub content: Vec<ChannelContent>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub trigger_event: Option<String>,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: Uuid,
    pub name: String,
    pub cost_center: String,
    pub campaign_type: CampaignType,
    pub channels: Vec<Channel>,
    pub recipient_source: Option<RecipientSource>,
    pub total_recipient_count: u64,
    pub recipients: Vec<RecipientEntry>,
    pub content: Vec<ChannelContent>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub trigger_event: Option<String>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl CampaignRecord {
    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            name: self.name.clone(),
            cost_center: self.cost_center.clone(),
            trigger_event: self.trigger_event.clone(),
            created_at: self.created_at,
        }
    }
}

/// Projection of a previous campaign used for name autocomplete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignSummary {
    pub name: String,
    pub cost_center: String,
    pub trigger_event: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ─── Audit Log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub user: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
}

// ─── API Request/Response types ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub target: crate::uploads::UploadTarget,
    pub file_name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// File content, standard base64.
    pub data_base64: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
