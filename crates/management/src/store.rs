//! In-memory management store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing.

use campaign_core::{CampaignResult, CampaignStatus, CampaignType, Channel};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::models::*;
use crate::suggestions::CampaignDirectory;

/// Trait for campaign persistence backends. Campaigns are only ever created
/// through this interface.
pub trait CampaignRepository: Send + Sync {
    fn create(&self, campaign: NewCampaign, user: &str) -> CampaignResult<CampaignRecord>;
}

/// Thread-safe in-memory store for campaigns and the audit log.
pub struct ManagementStore {
    campaigns: DashMap<Uuid, CampaignRecord>,
    audit_log: DashMap<Uuid, AuditLogEntry>,
}

impl Default for ManagementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagementStore {
    pub fn new() -> Self {
        info!("Management store initialized (in-memory, development mode)");
        Self {
            campaigns: DashMap::new(),
            audit_log: DashMap::new(),
        }
    }

    /// Store pre-populated with a few past campaigns so autocomplete has
    /// something to offer in development.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        store.seed_demo_data();
        store
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    pub fn list_campaigns(&self) -> Vec<CampaignRecord> {
        let mut campaigns: Vec<CampaignRecord> = self.campaigns.iter().map(|r| r.value().clone()).collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns
    }

    pub fn get_campaign(&self, id: Uuid) -> Option<CampaignRecord> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    pub fn campaign_count(&self) -> usize {
        self.campaigns.len()
    }

    // ─── Audit Log ─────────────────────────────────────────────────────────

    pub fn get_audit_log(&self) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = self.audit_log.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    fn log_audit(&self, user: &str, action: AuditAction, resource_type: &str, resource_id: &str, details: serde_json::Value) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            user: user.to_string(),
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details,
            timestamp: Utc::now(),
        };
        self.audit_log.insert(entry.id, entry);
    }

    fn seed_demo_data(&self) {
        let now = Utc::now();
        let seeds = [
            ("Spring Sale Newsletter", "MKT-100", CampaignType::Campaign, vec![Channel::Email], 30),
            ("Store Opening Madrid", "RET-210", CampaignType::Campaign, vec![Channel::Sms, Channel::Letter], 21),
            ("Appointment Reminder", "OPS-300", CampaignType::QuickSend, vec![Channel::Whatsapp], 14),
            ("Loyalty Points Expiry", "MKT-100", CampaignType::Campaign, vec![Channel::Email, Channel::Rcs], 7),
        ];

        for (name, cost_center, campaign_type, channels, days_ago) in seeds {
            let record = CampaignRecord {
                id: Uuid::new_v4(),
                name: name.to_string(),
                cost_center: cost_center.to_string(),
                campaign_type,
                channels,
                recipient_source: None,
                total_recipient_count: 0,
                recipients: Vec::new(),
                content: Vec::new(),
                scheduled_date: None,
                trigger_event: None,
                status: CampaignStatus::Draft,
                created_at: now - Duration::days(days_ago),
                created_by: "seed".to_string(),
            };
            self.campaigns.insert(record.id, record);
        }
        info!(count = self.campaigns.len(), "Seeded demo campaigns");
    }
}

impl CampaignRepository for ManagementStore {
    fn create(&self, campaign: NewCampaign, user: &str) -> CampaignResult<CampaignRecord> {
        let record = CampaignRecord {
            id: Uuid::new_v4(),
            name: campaign.name,
            cost_center: campaign.cost_center,
            campaign_type: campaign.campaign_type,
            channels: campaign.channels,
            recipient_source: campaign.recipient_source,
            total_recipient_count: campaign.total_recipient_count,
            recipients: campaign.recipients,
            content: campaign.content,
            scheduled_date: campaign.scheduled_date,
            trigger_event: campaign.trigger_event,
            status: campaign.status,
            created_at: Utc::now(),
            created_by: user.to_string(),
        };
        let id = record.id;
        self.campaigns.insert(id, record.clone());
        self.log_audit(
            user,
            AuditAction::Create,
            "campaign",
            &id.to_string(),
            serde_json::json!({"name": &record.name, "status": record.status.as_str()}),
        );
        metrics::counter!("management.campaigns.created").increment(1);
        info!(campaign_id = %id, name = %record.name, status = record.status.as_str(), "Campaign created");
        Ok(record)
    }
}

impl CampaignDirectory for ManagementStore {
    fn recent_campaigns(&self, limit: usize) -> CampaignResult<Vec<CampaignSummary>> {
        Ok(self
            .list_campaigns()
            .into_iter()
            .take(limit)
            .map(|c| c.summary())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_campaign(name: &str) -> NewCampaign {
        NewCampaign {
            name: name.to_string(),
            cost_center: "CC-1".to_string(),
            campaign_type: CampaignType::Campaign,
            channels: vec![Channel::Email],
            recipient_source: None,
            total_recipient_count: 10,
            recipients: Vec::new(),
            content: Vec::new(),
            scheduled_date: None,
            trigger_event: None,
            status: CampaignStatus::Draft,
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = ManagementStore::new();
        let record = store.create(new_campaign("Autumn"), "alice").unwrap();
        assert_eq!(record.created_by, "alice");

        let fetched = store.get_campaign(record.id).unwrap();
        assert_eq!(fetched.name, "Autumn");
        assert_eq!(store.campaign_count(), 1);

        let audit = store.get_audit_log();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, AuditAction::Create);
        assert_eq!(audit[0].resource_id, record.id.to_string());
    }

    #[test]
    fn test_recent_campaigns_newest_first() {
        let store = ManagementStore::with_demo_data();
        store.create(new_campaign("Brand New"), "bob").unwrap();

        let recent = store.recent_campaigns(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].name, "Brand New");
        assert_eq!(recent[1].name, "Loyalty Points Expiry");
    }

    #[test]
    fn test_empty_store() {
        let store = ManagementStore::new();
        assert!(store.list_campaigns().is_empty());
        assert!(store.recent_campaigns(10).unwrap().is_empty());
        assert!(store.get_campaign(Uuid::new_v4()).is_none());
    }
}
