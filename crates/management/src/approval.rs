//! Approved-recipient calculation from validation counts and toggles.
//!
//! Categories do not share one polarity. Exclusion categories (blacklist,
//! duplicate, do-not-disturb, over-length) remove recipients while their
//! toggle is on. Inclusion categories (with/without a secondary channel) and
//! the letter address defects ("keep despite defect") remove recipients while
//! their toggle is off. Each category carries its own [`TogglePolicy`].

use campaign_core::{CampaignError, CampaignResult, Channel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A class of recipients flagged by validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Invalid,
    Blacklist,
    Duplicate,
    DoNotDisturb,
    OverLength,
    HasSecondaryChannel,
    WithoutSecondaryChannel,
    InconsistentAddress,
    PostalCodeMismatch,
    MissingStreetNumber,
}

/// When a category's recipients are taken out of the approved pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePolicy {
    /// Not toggleable; always removed.
    AlwaysExcluded,
    ExcludeWhenEnabled,
    ExcludeWhenDisabled,
}

impl ValidationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCategory::Invalid => "invalid",
            ValidationCategory::Blacklist => "blacklist",
            ValidationCategory::Duplicate => "duplicate",
            ValidationCategory::DoNotDisturb => "do_not_disturb",
            ValidationCategory::OverLength => "over_length",
            ValidationCategory::HasSecondaryChannel => "has_secondary_channel",
            ValidationCategory::WithoutSecondaryChannel => "without_secondary_channel",
            ValidationCategory::InconsistentAddress => "inconsistent_address",
            ValidationCategory::PostalCodeMismatch => "postal_code_mismatch",
            ValidationCategory::MissingStreetNumber => "missing_street_number",
        }
    }

    pub fn policy(&self) -> TogglePolicy {
        match self {
            ValidationCategory::Invalid => TogglePolicy::AlwaysExcluded,
            ValidationCategory::Blacklist
            | ValidationCategory::Duplicate
            | ValidationCategory::DoNotDisturb
            | ValidationCategory::OverLength => TogglePolicy::ExcludeWhenEnabled,
            ValidationCategory::HasSecondaryChannel
            | ValidationCategory::WithoutSecondaryChannel
            | ValidationCategory::InconsistentAddress
            | ValidationCategory::PostalCodeMismatch
            | ValidationCategory::MissingStreetNumber => TogglePolicy::ExcludeWhenDisabled,
        }
    }

    /// Toggleable categories a channel carries, with their default state.
    pub fn defaults_for(channel: Channel) -> &'static [(ValidationCategory, bool)] {
        use ValidationCategory::*;
        match channel {
            Channel::Email => &[(Blacklist, true), (Duplicate, true), (DoNotDisturb, false)],
            Channel::Sms => &[
                (Blacklist, true),
                (Duplicate, true),
                (DoNotDisturb, true),
                (OverLength, false),
                (HasSecondaryChannel, true),
                (WithoutSecondaryChannel, true),
            ],
            Channel::Whatsapp => &[
                (Blacklist, true),
                (Duplicate, true),
                (DoNotDisturb, true),
                (HasSecondaryChannel, true),
                (WithoutSecondaryChannel, true),
            ],
            Channel::Rcs => &[
                (Blacklist, true),
                (Duplicate, true),
                (DoNotDisturb, true),
                (OverLength, false),
                (HasSecondaryChannel, true),
                (WithoutSecondaryChannel, true),
            ],
            Channel::Letter => &[
                (Duplicate, true),
                (InconsistentAddress, false),
                (PostalCodeMismatch, false),
                (MissingStreetNumber, false),
            ],
        }
    }

    /// Every category an evaluator reports for `channel`: invalid plus the
    /// channel's toggleable ones.
    pub fn evaluated_for(channel: Channel) -> impl Iterator<Item = ValidationCategory> {
        std::iter::once(ValidationCategory::Invalid)
            .chain(Self::defaults_for(channel).iter().map(|(category, _)| *category))
    }
}

/// Toggle state for one channel. Lives only in the wizard session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationToggleSet {
    pub channel: Channel,
    pub toggles: BTreeMap<ValidationCategory, bool>,
}

impl ValidationToggleSet {
    pub fn defaults(channel: Channel) -> Self {
        Self {
            channel,
            toggles: ValidationCategory::defaults_for(channel).iter().copied().collect(),
        }
    }

    /// `None` when the channel does not carry this category.
    pub fn is_enabled(&self, category: ValidationCategory) -> Option<bool> {
        self.toggles.get(&category).copied()
    }

    pub fn set(&mut self, category: ValidationCategory, enabled: bool) -> CampaignResult<()> {
        match self.toggles.get_mut(&category) {
            Some(state) => {
                *state = enabled;
                Ok(())
            }
            None => Err(CampaignError::Validation(format!(
                "{} has no '{}' toggle",
                self.channel.display_name(),
                category.as_str(),
            ))),
        }
    }
}

/// Baseline validation result for one channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationCounts {
    pub total: u64,
    pub counts: BTreeMap<ValidationCategory, u64>,
}

impl ValidationCounts {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            counts: BTreeMap::new(),
        }
    }

    pub fn with(mut self, category: ValidationCategory, count: u64) -> Self {
        self.counts.insert(category, count);
        self
    }

    pub fn get(&self, category: ValidationCategory) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }
}

/// Recipients left after applying the toggles to the counts. Always within
/// `0..=counts.total`.
pub fn approved_count(counts: &ValidationCounts, toggles: &ValidationToggleSet) -> u64 {
    let mut approved = counts
        .total
        .saturating_sub(counts.get(ValidationCategory::Invalid));

    for (&category, &enabled) in &toggles.toggles {
        let excluded = match category.policy() {
            TogglePolicy::AlwaysExcluded => false,
            TogglePolicy::ExcludeWhenEnabled => enabled,
            TogglePolicy::ExcludeWhenDisabled => !enabled,
        };
        if excluded {
            approved = approved.saturating_sub(counts.get(category));
        }
    }

    approved.min(counts.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValidationCategory::*;

    fn email_counts() -> ValidationCounts {
        ValidationCounts::new(1000)
            .with(Invalid, 50)
            .with(Blacklist, 20)
            .with(Duplicate, 30)
            .with(DoNotDisturb, 40)
    }

    #[test]
    fn test_email_blacklist_and_duplicate_enabled() {
        let mut toggles = ValidationToggleSet::defaults(Channel::Email);
        toggles.set(Blacklist, true).unwrap();
        toggles.set(Duplicate, true).unwrap();
        toggles.set(DoNotDisturb, false).unwrap();
        assert_eq!(approved_count(&email_counts(), &toggles), 900);
    }

    #[test]
    fn test_email_all_toggles_disabled_only_removes_invalid() {
        let mut toggles = ValidationToggleSet::defaults(Channel::Email);
        for category in [Blacklist, Duplicate, DoNotDisturb] {
            toggles.set(category, false).unwrap();
        }
        assert_eq!(approved_count(&email_counts(), &toggles), 950);
    }

    #[test]
    fn test_secondary_channel_inclusion_polarity() {
        let counts = ValidationCounts::new(1000)
            .with(Invalid, 10)
            .with(HasSecondaryChannel, 600)
            .with(WithoutSecondaryChannel, 100);
        let mut toggles = ValidationToggleSet::defaults(Channel::Sms);
        for category in [Blacklist, Duplicate, DoNotDisturb, OverLength] {
            toggles.set(category, false).unwrap();
        }
        // both inclusion toggles on: nothing removed beyond invalid
        assert_eq!(approved_count(&counts, &toggles), 990);

        toggles.set(WithoutSecondaryChannel, false).unwrap();
        assert_eq!(approved_count(&counts, &toggles), 890);

        toggles.set(HasSecondaryChannel, false).unwrap();
        assert_eq!(approved_count(&counts, &toggles), 290);
    }

    #[test]
    fn test_letter_defects_removed_unless_kept() {
        let counts = ValidationCounts::new(500)
            .with(Invalid, 5)
            .with(Duplicate, 10)
            .with(InconsistentAddress, 20)
            .with(PostalCodeMismatch, 30)
            .with(MissingStreetNumber, 40);
        let mut toggles = ValidationToggleSet::defaults(Channel::Letter);
        // defaults: duplicates excluded, every defect excluded
        assert_eq!(approved_count(&counts, &toggles), 500 - 5 - 10 - 20 - 30 - 40);

        toggles.set(PostalCodeMismatch, true).unwrap();
        toggles.set(MissingStreetNumber, true).unwrap();
        assert_eq!(approved_count(&counts, &toggles), 500 - 5 - 10 - 20);
    }

    #[test]
    fn test_categories_outside_channel_are_ignored() {
        // letter carries no blacklist toggle, so a blacklist count has no effect
        let counts = ValidationCounts::new(100).with(Blacklist, 90);
        let toggles = ValidationToggleSet::defaults(Channel::Letter);
        assert_eq!(approved_count(&counts, &toggles), 100);
    }

    #[test]
    fn test_never_negative() {
        let counts = ValidationCounts::new(100)
            .with(Invalid, 80)
            .with(Blacklist, 50)
            .with(Duplicate, 50)
            .with(DoNotDisturb, 50)
            .with(OverLength, 50)
            .with(HasSecondaryChannel, 500)
            .with(WithoutSecondaryChannel, 500);
        for channel in Channel::ALL {
            let mut toggles = ValidationToggleSet::defaults(channel);
            for state in [true, false] {
                let categories: Vec<_> = toggles.toggles.keys().copied().collect();
                for category in categories {
                    toggles.set(category, state).unwrap();
                    assert!(approved_count(&counts, &toggles) <= 100);
                }
            }
        }

        let overflowing = ValidationCounts::new(10).with(Invalid, 1000);
        let toggles = ValidationToggleSet::defaults(Channel::Email);
        assert_eq!(approved_count(&overflowing, &toggles), 0);
    }

    #[test]
    fn test_zero_total() {
        for channel in Channel::ALL {
            let toggles = ValidationToggleSet::defaults(channel);
            assert_eq!(approved_count(&ValidationCounts::new(0), &toggles), 0);
        }
    }

    #[test]
    fn test_toggle_unknown_category_rejected() {
        let mut toggles = ValidationToggleSet::defaults(Channel::Email);
        let err = toggles.set(MissingStreetNumber, true).unwrap_err();
        assert!(err.to_string().contains("missing_street_number"));
        assert!(toggles.is_enabled(MissingStreetNumber).is_none());
    }

    #[test]
    fn test_channel_defaults_differ() {
        let email = ValidationToggleSet::defaults(Channel::Email);
        let sms = ValidationToggleSet::defaults(Channel::Sms);
        assert_eq!(email.is_enabled(DoNotDisturb), Some(false));
        assert_eq!(sms.is_enabled(DoNotDisturb), Some(true));
        assert_eq!(sms.is_enabled(OverLength), Some(false));
        assert!(email.is_enabled(HasSecondaryChannel).is_none());
    }

    #[test]
    fn test_evaluated_categories_start_with_invalid() {
        let categories: Vec<_> = ValidationCategory::evaluated_for(Channel::Whatsapp).collect();
        assert_eq!(categories[0], Invalid);
        assert_eq!(categories.len(), 6);
        assert!(!categories.contains(&OverLength));
    }
}
