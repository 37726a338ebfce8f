//! Campaign composition wizard: step state machine over a [`CampaignDraft`].
//!
//! A [`WizardSession`] owns the draft. Steps never mutate it directly; they
//! send [`DraftUpdate`] messages through [`WizardSession::apply`]. Forward
//! navigation is gated on the current step's completion predicate.

use campaign_channels::{ChannelContent, ContentLimits, ContentWarning, SegmentInfo, SendTiming};
use campaign_core::config::WizardConfig;
use campaign_core::{CampaignError, CampaignResult, CampaignStatus, CampaignType, Channel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::approval::{approved_count, ValidationCounts, ValidationToggleSet};
use crate::evaluator::{RecipientPool, ValidationEvaluator};
use crate::models::*;
use crate::requests::RequestToken;
use crate::store::CampaignRepository;
use crate::suggestions::{CampaignDirectory, NameSuggester};
use crate::uploads::{count_recipient_rows, FileStorage, UploadOutcome, UploadTarget, UploadTracker, UploadedFile};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectType,
    BasicInfo,
    SelectChannels,
    SelectRecipients,
    EditContent,
    ReviewAndSchedule,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::SelectType,
        WizardStep::BasicInfo,
        WizardStep::SelectChannels,
        WizardStep::SelectRecipients,
        WizardStep::EditContent,
        WizardStep::ReviewAndSchedule,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

/// Why `step` cannot be left yet, or `None` when its predicate holds.
pub fn missing_requirement(step: WizardStep, draft: &CampaignDraft) -> Option<&'static str> {
    match step {
        WizardStep::SelectType => draft
            .campaign_type
            .is_none()
            .then_some("choose a campaign type"),
        WizardStep::BasicInfo => {
            if draft.name.trim().is_empty() {
                Some("campaign name is required")
            } else if draft.campaign_type.is_some_and(|t| t.requires_cost_center())
                && draft.cost_center.trim().is_empty()
            {
                Some("cost center is required")
            } else {
                None
            }
        }
        WizardStep::SelectChannels => draft
            .channels
            .is_empty()
            .then_some("select at least one channel"),
        WizardStep::SelectRecipients => {
            if draft.is_quick_send() {
                draft
                    .recipients
                    .is_empty()
                    .then_some("add at least one recipient")
            } else if draft.recipient_source.is_none() {
                Some("choose a recipient source")
            } else if draft.total_recipient_count == 0 {
                Some("recipient source has no recipients")
            } else {
                None
            }
        }
        WizardStep::EditContent | WizardStep::ReviewAndSchedule => None,
    }
}

pub fn can_proceed(step: WizardStep, draft: &CampaignDraft) -> bool {
    missing_requirement(step, draft).is_none()
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Navigation targets outside the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    AutomationBuilder,
    CampaignList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Advanced { from: WizardStep, to: WizardStep },
    Retreated { from: WizardStep, to: WizardStep },
    /// Predicate failed; nothing changed.
    Blocked { step: WizardStep, reason: String },
    /// Leave the wizard for another flow.
    Redirected { redirect: Redirect },
    /// Back on the first step or forward on the last one.
    Unchanged { step: WizardStep },
}

/// Per-channel validation result on the review step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPreview {
    pub channel: Channel,
    pub counts: ValidationCounts,
    pub toggles: ValidationToggleSet,
    pub approved: u64,
    /// When the channel sends; `None` until content is entered.
    pub timing: Option<SendTiming>,
    /// Encoding and segment count of the SMS body.
    pub sms_segments: Option<SegmentInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPreview {
    pub name: String,
    pub cost_center: String,
    pub campaign_type: Option<CampaignType>,
    pub total_recipient_count: u64,
    pub channels: Vec<ChannelPreview>,
    pub warnings: Vec<ContentWarning>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub status_on_submit: CampaignStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub campaign: CampaignRecord,
    pub redirect: Redirect,
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub step: WizardStep,
    pub step_index: usize,
    pub can_proceed: bool,
    pub blocked_reason: Option<&'static str>,
    pub draft: CampaignDraft,
    pub toggles: Vec<ValidationToggleSet>,
    pub uploads_in_progress: Vec<UploadTarget>,
    pub submitted: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's pass through the wizard. Dropping it discards the draft.
#[derive(Debug)]
pub struct WizardSession {
    id: Uuid,
    step: WizardStep,
    draft: CampaignDraft,
    toggles: BTreeMap<Channel, ValidationToggleSet>,
    uploads: UploadTracker,
    suggester: NameSuggester,
    config: WizardConfig,
    submitted: bool,
    created_at: DateTime<Utc>,
    last_touched: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(config: WizardConfig) -> Self {
        let id = Uuid::new_v4();
        debug!(session_id = %id, "Wizard session started");
        Self {
            id,
            step: WizardStep::SelectType,
            draft: CampaignDraft::default(),
            toggles: BTreeMap::new(),
            uploads: UploadTracker::new(),
            suggester: NameSuggester::new(config.max_suggestions),
            config,
            submitted: false,
            created_at: Utc::now(),
            last_touched: Utc::now(),
        }
    }

    /// Record activity so the idle sweep keeps the session.
    pub fn touch(&mut self) {
        self.last_touched = Utc::now();
    }

    pub fn last_touched(&self) -> DateTime<Utc> {
        self.last_touched
    }

    /// True when nothing touched the session for longer than `ttl`.
    pub fn is_idle(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_touched > ttl
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &CampaignDraft {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn can_proceed(&self) -> bool {
        can_proceed(self.step, &self.draft)
    }

    /// Current toggles for `channel`, or its defaults if never touched.
    pub fn toggles(&self, channel: Channel) -> ValidationToggleSet {
        self.toggles
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| ValidationToggleSet::defaults(channel))
    }

    pub fn is_upload_in_progress(&self, target: UploadTarget) -> bool {
        self.uploads.is_in_progress(target)
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            id: self.id,
            step: self.step,
            step_index: self.step.index(),
            can_proceed: self.can_proceed(),
            blocked_reason: missing_requirement(self.step, &self.draft),
            draft: self.draft.clone(),
            toggles: self.draft.channels.iter().map(|c| self.toggles(*c)).collect(),
            uploads_in_progress: self.uploads.in_progress(),
            submitted: self.submitted,
            created_at: self.created_at,
        }
    }

    // ─── Updates ───────────────────────────────────────────────────────────

    pub fn apply(&mut self, update: DraftUpdate) -> CampaignResult<()> {
        self.ensure_open()?;

        match update {
            DraftUpdate::SetType { campaign_type } => self.set_type(campaign_type)?,
            DraftUpdate::SetName { name } => self.draft.name = name,
            DraftUpdate::SetCostCenter { cost_center } => self.draft.cost_center = cost_center,
            DraftUpdate::SetChannels { channels } => {
                let wanted: BTreeSet<Channel> = channels.into_iter().collect();
                let current = self.draft.channels.clone();
                for channel in current.difference(&wanted) {
                    self.deselect_channel(*channel);
                }
                for channel in wanted.difference(&current) {
                    self.select_channel(*channel);
                }
            }
            DraftUpdate::ToggleChannel { channel } => {
                if self.draft.channels.contains(&channel) {
                    self.deselect_channel(channel);
                } else {
                    self.select_channel(channel);
                }
            }
            DraftUpdate::SetRecipientSource { source, total_recipient_count } => {
                self.ensure_list_based()?;
                if source == RecipientSource::ManualEntry {
                    return Err(CampaignError::Validation(
                        "manual entry is only available for quick sends".to_string(),
                    ));
                }
                self.draft.recipient_source = Some(source);
                self.draft.total_recipient_count = total_recipient_count;
            }
            DraftUpdate::AddRecipient { recipient } => {
                self.ensure_quick_send()?;
                self.draft.recipients.add(recipient)?;
                self.sync_recipient_count();
            }
            DraftUpdate::BulkPasteRecipients { text } => {
                self.ensure_quick_send()?;
                let added = self.draft.recipients.bulk_paste(&text);
                debug!(session_id = %self.id, added, "Bulk recipients pasted");
                self.sync_recipient_count();
            }
            DraftUpdate::RemoveRecipient { index } => {
                self.ensure_quick_send()?;
                self.draft.recipients.remove(index)?;
                self.sync_recipient_count();
            }
            DraftUpdate::SetContent { content } => {
                let channel = content.channel();
                if !self.draft.channels.contains(&channel) {
                    return Err(CampaignError::Validation(format!(
                        "{} is not a selected channel",
                        channel.display_name()
                    )));
                }
                self.draft.content.insert(channel, content);
            }
            DraftUpdate::SetSchedule { scheduled_date } => {
                if scheduled_date <= Utc::now() {
                    return Err(CampaignError::Validation(
                        "scheduled date must be in the future".to_string(),
                    ));
                }
                self.draft.scheduled_date = Some(scheduled_date);
            }
            DraftUpdate::ClearSchedule => self.draft.scheduled_date = None,
            DraftUpdate::SetTriggerEvent { trigger_event } => {
                let trigger_event = trigger_event
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty());
                if trigger_event.is_some() && self.draft.campaign_type != Some(CampaignType::Automation) {
                    return Err(CampaignError::Validation(
                        "trigger events only apply to automations".to_string(),
                    ));
                }
                self.draft.trigger_event = trigger_event;
            }
            DraftUpdate::SetValidationToggle { channel, category, enabled } => {
                if !self.draft.channels.contains(&channel) {
                    return Err(CampaignError::Validation(format!(
                        "{} is not a selected channel",
                        channel.display_name()
                    )));
                }
                self.toggles
                    .entry(channel)
                    .or_insert_with(|| ValidationToggleSet::defaults(channel))
                    .set(category, enabled)?;
            }
            DraftUpdate::ApplySuggestion { suggestion } => {
                self.draft.name = suggestion.name;
                if !suggestion.cost_center.is_empty() {
                    self.draft.cost_center = suggestion.cost_center;
                }
                if self.draft.campaign_type == Some(CampaignType::Automation) {
                    self.draft.trigger_event = suggestion.trigger_event;
                }
            }
        }

        Ok(())
    }

    fn set_type(&mut self, campaign_type: CampaignType) -> CampaignResult<()> {
        if self.step != WizardStep::SelectType {
            return Err(CampaignError::Navigation(
                "campaign type can only be changed on the first step".to_string(),
            ));
        }

        let was_quick_send = self.draft.is_quick_send();
        let is_quick_send = campaign_type == CampaignType::QuickSend;
        if self.draft.campaign_type.is_some() && was_quick_send != is_quick_send {
            // recipient acquisition differs between the two paths
            self.draft.recipients.clear();
            self.draft.recipient_source = None;
            self.draft.total_recipient_count = 0;
        }
        if campaign_type != CampaignType::Automation {
            self.draft.trigger_event = None;
        }
        self.draft.campaign_type = Some(campaign_type);
        Ok(())
    }

    fn select_channel(&mut self, channel: Channel) {
        self.draft.channels.insert(channel);
        self.draft
            .content
            .entry(channel)
            .or_insert_with(|| ChannelContent::empty(channel));
    }

    fn deselect_channel(&mut self, channel: Channel) {
        self.draft.channels.remove(&channel);
        self.draft.content.remove(&channel);
        self.toggles.remove(&channel);
    }

    fn sync_recipient_count(&mut self) {
        let len = self.draft.recipients.len();
        self.draft.total_recipient_count = len as u64;
        self.draft.recipient_source = (len > 0).then_some(RecipientSource::ManualEntry);
    }

    fn ensure_open(&self) -> CampaignResult<()> {
        if self.submitted {
            return Err(CampaignError::Conflict(format!(
                "wizard session {} was already submitted",
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_quick_send(&self) -> CampaignResult<()> {
        if !self.draft.is_quick_send() {
            return Err(CampaignError::Validation(
                "manual recipients are only available for quick sends".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_list_based(&self) -> CampaignResult<()> {
        match self.draft.campaign_type {
            None => Err(CampaignError::Validation("choose a campaign type first".to_string())),
            Some(CampaignType::QuickSend) => Err(CampaignError::Validation(
                "quick sends take manually entered recipients".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    // ─── Navigation ────────────────────────────────────────────────────────

    pub fn forward(&mut self) -> NavigationOutcome {
        let from = self.step;

        if from == WizardStep::SelectType && self.draft.campaign_type == Some(CampaignType::Automation) {
            info!(session_id = %self.id, "Automation selected, redirecting to automation builder");
            return NavigationOutcome::Redirected {
                redirect: Redirect::AutomationBuilder,
            };
        }

        let Some(to) = from.next() else {
            return NavigationOutcome::Unchanged { step: from };
        };

        if let Some(reason) = missing_requirement(from, &self.draft) {
            debug!(session_id = %self.id, step = ?from, reason, "Forward navigation blocked");
            metrics::counter!("wizard.navigation.blocked").increment(1);
            return NavigationOutcome::Blocked {
                step: from,
                reason: reason.to_string(),
            };
        }

        self.step = to;
        debug!(session_id = %self.id, from = ?from, to = ?to, "Wizard advanced");
        NavigationOutcome::Advanced { from, to }
    }

    pub fn back(&mut self) -> NavigationOutcome {
        let from = self.step;
        match from.previous() {
            Some(to) => {
                self.step = to;
                NavigationOutcome::Retreated { from, to }
            }
            None => NavigationOutcome::Unchanged { step: from },
        }
    }

    // ─── Review ────────────────────────────────────────────────────────────

    pub fn preview(&self, evaluator: &dyn ValidationEvaluator) -> ReviewPreview {
        let pool = if self.draft.is_quick_send() {
            RecipientPool::from_entries(self.draft.recipients.entries())
        } else {
            RecipientPool::counted(self.draft.total_recipient_count)
        };

        let channels = self
            .draft
            .channels
            .iter()
            .map(|&channel| {
                let counts = evaluator.evaluate(&pool, channel);
                let toggles = self.toggles(channel);
                let approved = approved_count(&counts, &toggles);
                let content = self.draft.content.get(&channel);
                let sms_segments = match content {
                    Some(ChannelContent::Sms(sms)) => Some(sms.segment_info()),
                    _ => None,
                };
                ChannelPreview {
                    channel,
                    counts,
                    toggles,
                    approved,
                    timing: content.map(ChannelContent::timing),
                    sms_segments,
                }
            })
            .collect();

        let limits = ContentLimits {
            sms_max_segments: self.config.sms_max_segments,
        };
        let warnings = self
            .draft
            .content
            .values()
            .flat_map(|content| content.warnings(&limits))
            .collect();

        ReviewPreview {
            name: self.draft.name.clone(),
            cost_center: self.draft.cost_center.clone(),
            campaign_type: self.draft.campaign_type,
            total_recipient_count: self.draft.total_recipient_count,
            channels,
            warnings,
            scheduled_date: self.draft.scheduled_date,
            status_on_submit: self.draft.status_on_submit(),
        }
    }

    // ─── Uploads ───────────────────────────────────────────────────────────

    /// Mark an upload as started. Fails if the target does not apply to the
    /// current draft.
    pub fn begin_upload(&mut self, target: UploadTarget) -> CampaignResult<RequestToken<UploadTarget>> {
        self.ensure_open()?;
        match target {
            UploadTarget::EmailAsset { .. } => {
                if !self.draft.channels.contains(&Channel::Email) {
                    return Err(CampaignError::Validation(
                        "email assets need the email channel selected".to_string(),
                    ));
                }
            }
            UploadTarget::RecipientFile => self.ensure_list_based()?,
        }
        Ok(self.uploads.begin(target))
    }

    /// Apply the storage result of an upload started with [`begin_upload`].
    ///
    /// [`begin_upload`]: WizardSession::begin_upload
    pub fn finish_upload(
        &mut self,
        token: RequestToken<UploadTarget>,
        file: &UploadedFile,
        result: CampaignResult<String>,
    ) -> UploadOutcome {
        let target = token.kind;
        if !self.uploads.finish(&token) {
            return UploadOutcome::Discarded { target };
        }
        if self.submitted {
            debug!(session_id = %self.id, upload = ?target, "Upload finished after submit, ignoring");
            return UploadOutcome::Discarded { target };
        }

        let url = match result {
            Ok(url) => url,
            Err(e) => {
                warn!(session_id = %self.id, file = %file.file_name, error = %e, "Upload failed");
                metrics::counter!("wizard.uploads.failed").increment(1);
                let alert = match target {
                    UploadTarget::EmailAsset { slot } => {
                        format!("Upload of the {} image '{}' failed: {e}", slot.as_str(), file.file_name)
                    }
                    UploadTarget::RecipientFile => format!("Upload of '{}' failed: {e}", file.file_name),
                };
                return UploadOutcome::Failed { target, alert };
            }
        };

        match target {
            UploadTarget::EmailAsset { slot } => {
                if let Some(ChannelContent::Email(email)) = self.draft.content.get_mut(&Channel::Email) {
                    email.set_asset_url(slot, url.clone());
                    debug!(session_id = %self.id, slot = slot.as_str(), "Email asset attached");
                } else {
                    // email was deselected while the upload was in flight
                    return UploadOutcome::Discarded { target };
                }
            }
            UploadTarget::RecipientFile => {
                self.draft.recipient_source = Some(RecipientSource::Upload {
                    file_name: file.file_name.clone(),
                    url: url.clone(),
                });
                self.draft.total_recipient_count = count_recipient_rows(&file.bytes);
            }
        }

        info!(session_id = %self.id, upload = ?target, url = %url, "Upload applied");
        UploadOutcome::Applied { target, url }
    }

    /// Begin, store and finish an upload in one go.
    pub fn upload(
        &mut self,
        target: UploadTarget,
        file: &UploadedFile,
        storage: &dyn FileStorage,
    ) -> CampaignResult<UploadOutcome> {
        let token = self.begin_upload(target)?;
        let result = storage.store(file);
        Ok(self.finish_upload(token, file, result))
    }

    // ─── Suggestions ───────────────────────────────────────────────────────

    pub fn begin_suggestion_fetch(&mut self) -> RequestToken<()> {
        self.suggester.begin_fetch()
    }

    pub fn finish_suggestion_fetch(
        &mut self,
        token: &RequestToken<()>,
        result: CampaignResult<Vec<CampaignSummary>>,
    ) -> bool {
        self.suggester.finish_fetch(token, result)
    }

    pub fn suggestions_loaded(&self) -> bool {
        self.suggester.is_loaded()
    }

    /// Suggestions for `query`, fetching recent campaigns on first use.
    pub fn suggestions(&mut self, query: &str, directory: &dyn CampaignDirectory) -> Vec<CampaignSummary> {
        if !self.suggester.is_loaded() {
            self.suggester.refresh(directory, self.config.suggestion_fetch_size);
        }
        self.suggester.suggest(query)
    }

    /// Suggestions from the cache only.
    pub fn cached_suggestions(&self, query: &str) -> Vec<CampaignSummary> {
        self.suggester.suggest(query)
    }

    // ─── Submission ────────────────────────────────────────────────────────

    /// Persist the draft. On failure the session is left as it was so the
    /// user can submit again.
    pub fn submit(&mut self, repository: &dyn CampaignRepository, user: &str) -> CampaignResult<SubmitOutcome> {
        self.ensure_open()?;
        if self.step != WizardStep::ReviewAndSchedule {
            return Err(CampaignError::Navigation(format!(
                "cannot submit from step {:?}",
                self.step
            )));
        }
        let campaign_type = match self.draft.campaign_type {
            Some(CampaignType::Automation) => {
                return Err(CampaignError::Validation(
                    "automations are built in the automation builder".to_string(),
                ))
            }
            Some(t) => t,
            None => return Err(CampaignError::Validation("campaign type is not set".to_string())),
        };

        let campaign = NewCampaign {
            name: self.draft.name.trim().to_string(),
            cost_center: self.draft.cost_center.trim().to_string(),
            campaign_type,
            channels: self.draft.channels.iter().copied().collect(),
            recipient_source: self.draft.recipient_source.clone(),
            total_recipient_count: self.draft.total_recipient_count,
            recipients: self.draft.recipients.entries().to_vec(),
            content: self.draft.content.values().cloned().collect(),
            scheduled_date: self.draft.scheduled_date,
            trigger_event: self.draft.trigger_event.clone(),
            status: self.draft.status_on_submit(),
        };

        match repository.create(campaign, user) {
            Ok(record) => {
                self.submitted = true;
                self.suggester.invalidate();
                metrics::counter!("wizard.submissions").increment(1);
                info!(
                    session_id = %self.id,
                    campaign_id = %record.id,
                    status = record.status.as_str(),
                    "Wizard submitted"
                );
                Ok(SubmitOutcome {
                    campaign: record,
                    redirect: Redirect::CampaignList,
                })
            }
            Err(e) => {
                metrics::counter!("wizard.submission_failures").increment(1);
                warn!(session_id = %self.id, error = %e, "Wizard submission failed");
                Err(e)
            }
        }
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new(WizardConfig::default())
    }
}
