//! End-to-end wizard flows against the in-memory store.

use campaign_channels::{AssetSlot, ChannelContent, EmailContent};
use campaign_core::{CampaignStatus, CampaignType, Channel};
use campaign_management::models::{CampaignSummary, DraftUpdate, RecipientSource};
use campaign_management::{
    EntryRulesEvaluator, InMemoryFileStorage, ManagementStore, MockEvaluator, NavigationOutcome, Redirect,
    UploadOutcome, UploadTarget, UploadedFile, ValidationCategory, WizardSession, WizardStep,
};
use chrono::{Duration, Utc};

fn advance(session: &mut WizardSession) {
    let outcome = session.forward();
    assert!(matches!(outcome, NavigationOutcome::Advanced { .. }), "{outcome:?}");
}

#[test]
fn quick_send_with_rules_evaluator() {
    let store = ManagementStore::new();
    let evaluator =
        EntryRulesEvaluator::new(Box::new(MockEvaluator::default())).with_blocklist(["600 999 888"]);
    let mut session = WizardSession::default();

    session.apply(DraftUpdate::SetType { campaign_type: CampaignType::QuickSend }).unwrap();
    advance(&mut session);
    session.apply(DraftUpdate::SetName { name: "Pickup reminder".to_string() }).unwrap();
    advance(&mut session);
    session.apply(DraftUpdate::ToggleChannel { channel: Channel::Sms }).unwrap();
    advance(&mut session);
    session
        .apply(DraftUpdate::BulkPasteRecipients {
            text: "Ana,ana@x.com,600 111 222\nBen,,600 111 222\nCid,cid@x.com,abc\n\nDee,,600 999 888".to_string(),
        })
        .unwrap();
    assert_eq!(session.draft().total_recipient_count, 4);
    advance(&mut session);
    advance(&mut session);
    assert_eq!(session.step(), WizardStep::ReviewAndSchedule);

    let preview = session.preview(&evaluator);
    let sms = &preview.channels[0];
    assert_eq!(sms.counts.get(ValidationCategory::Invalid), 1);
    assert_eq!(sms.counts.get(ValidationCategory::Duplicate), 1);
    assert_eq!(sms.counts.get(ValidationCategory::Blacklist), 1);
    assert_eq!(sms.counts.get(ValidationCategory::HasSecondaryChannel), 1);
    // Dee is blacklisted only, not also counted as lacking an email
    assert_eq!(sms.counts.get(ValidationCategory::WithoutSecondaryChannel), 0);
    assert_eq!(sms.approved, 1);

    session
        .apply(DraftUpdate::SetValidationToggle {
            channel: Channel::Sms,
            category: ValidationCategory::HasSecondaryChannel,
            enabled: false,
        })
        .unwrap();
    assert_eq!(session.preview(&evaluator).channels[0].approved, 0);

    let outcome = session.submit(&store, "ops").unwrap();
    assert_eq!(outcome.redirect, Redirect::CampaignList);
    assert_eq!(outcome.campaign.status, CampaignStatus::Draft);
    assert_eq!(outcome.campaign.recipients.len(), 4);
    assert_eq!(outcome.campaign.recipient_source, Some(RecipientSource::ManualEntry));
    assert_eq!(store.get_audit_log().len(), 1);
}

#[test]
fn scheduled_campaign_with_email_assets() {
    let store = ManagementStore::with_demo_data();
    let storage = InMemoryFileStorage::new("https://cdn.example.com/assets/", 1024).unwrap();
    let mut session = WizardSession::default();

    session.apply(DraftUpdate::SetType { campaign_type: CampaignType::Campaign }).unwrap();
    advance(&mut session);

    let suggestions = session.suggestions("newsletter", &store);
    assert_eq!(suggestions.len(), 1);
    session
        .apply(DraftUpdate::ApplySuggestion { suggestion: suggestions[0].clone() })
        .unwrap();
    assert_eq!(session.draft().cost_center, "MKT-100");
    advance(&mut session);

    session
        .apply(DraftUpdate::SetChannels { channels: vec![Channel::Email, Channel::Letter] })
        .unwrap();
    advance(&mut session);

    let csv = UploadedFile {
        file_name: "recipients.csv".to_string(),
        content_type: "text/csv".to_string(),
        bytes: b"name,email\nA,a@x.com\nB,b@x.com\nC,c@x.com\n".to_vec(),
    };
    let outcome = session.upload(UploadTarget::RecipientFile, &csv, &storage).unwrap();
    assert!(matches!(outcome, UploadOutcome::Applied { .. }));
    assert_eq!(session.draft().total_recipient_count, 3);
    advance(&mut session);

    let logo = UploadedFile {
        file_name: "logo.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    };
    let outcome = session
        .upload(UploadTarget::EmailAsset { slot: AssetSlot::Logo }, &logo, &storage)
        .unwrap();
    let UploadOutcome::Applied { url, .. } = outcome else {
        panic!("logo upload not applied: {outcome:?}");
    };
    assert!(url.starts_with("https://cdn.example.com/assets/"));

    let oversized = UploadedFile {
        file_name: "header.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0; 2048],
    };
    let outcome = session
        .upload(UploadTarget::EmailAsset { slot: AssetSlot::Header }, &oversized, &storage)
        .unwrap();
    assert!(matches!(outcome, UploadOutcome::Failed { .. }));
    assert!(session.snapshot().uploads_in_progress.is_empty());
    advance(&mut session);

    session
        .apply(DraftUpdate::SetSchedule { scheduled_date: Utc::now() + Duration::days(3) })
        .unwrap();
    let preview = session.preview(&MockEvaluator::default());
    assert_eq!(preview.channels.len(), 2);
    assert_eq!(preview.status_on_submit, CampaignStatus::Scheduled);

    let outcome = session.submit(&store, "ops").unwrap();
    assert_eq!(outcome.campaign.status, CampaignStatus::Scheduled);
    let email = outcome
        .campaign
        .content
        .iter()
        .find_map(|c| match c {
            ChannelContent::Email(email) => Some(email.clone()),
            _ => None,
        })
        .unwrap_or_else(EmailContent::default);
    assert_eq!(email.logo_url.as_deref(), Some(url.as_str()));
    assert!(email.header_url.is_none());
    assert_eq!(store.campaign_count(), 5);
}

#[test]
fn back_navigation_keeps_draft() {
    let mut session = WizardSession::default();
    session.apply(DraftUpdate::SetType { campaign_type: CampaignType::Campaign }).unwrap();
    advance(&mut session);
    session.apply(DraftUpdate::SetName { name: "Keep me".to_string() }).unwrap();
    session.apply(DraftUpdate::SetCostCenter { cost_center: "CC".to_string() }).unwrap();
    advance(&mut session);

    assert!(matches!(session.back(), NavigationOutcome::Retreated { .. }));
    assert!(matches!(session.back(), NavigationOutcome::Retreated { .. }));
    assert_eq!(session.step(), WizardStep::SelectType);
    assert_eq!(session.draft().name, "Keep me");
}

#[test]
fn stale_suggestion_fetch_is_discarded() {
    let mut session = WizardSession::default();
    let summary = |name: &str| CampaignSummary {
        name: name.to_string(),
        cost_center: String::new(),
        trigger_event: None,
        created_at: Utc::now(),
    };

    let first = session.begin_suggestion_fetch();
    let second = session.begin_suggestion_fetch();
    assert!(session.finish_suggestion_fetch(&second, Ok(vec![summary("Fresh list")])));
    assert!(!session.finish_suggestion_fetch(&first, Ok(vec![summary("Stale list")])));

    assert_eq!(session.cached_suggestions("list").len(), 1);
    assert_eq!(session.cached_suggestions("list")[0].name, "Fresh list");
}
