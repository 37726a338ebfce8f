//! Pluggable validation evaluators producing per-channel [`ValidationCounts`].
//!
//! [`MockEvaluator`] derives counts as fixed fractions of the total.
//! [`EntryRulesEvaluator`] inspects the quick-send entries themselves and
//! delegates to a fallback when it only has a count to work with.

use campaign_core::config::{EvaluatorKind, ValidationConfig};
use campaign_core::Channel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::approval::{ValidationCategory, ValidationCounts};
use crate::recipients::RecipientEntry;

/// The recipients a channel is evaluated against. `entries` is empty when
/// recipients come from an uploaded file or a stored list.
#[derive(Debug, Clone, Copy)]
pub struct RecipientPool<'a> {
    pub total: u64,
    pub entries: &'a [RecipientEntry],
}

impl<'a> RecipientPool<'a> {
    pub fn counted(total: u64) -> Self {
        Self { total, entries: &[] }
    }

    pub fn from_entries(entries: &'a [RecipientEntry]) -> Self {
        Self {
            total: entries.len() as u64,
            entries,
        }
    }

    /// Whether every recipient is available as an entry.
    pub fn is_itemized(&self) -> bool {
        self.entries.len() as u64 == self.total
    }
}

/// Trait for validation backends.
pub trait ValidationEvaluator: Send + Sync {
    fn evaluate(&self, recipients: &RecipientPool<'_>, channel: Channel) -> ValidationCounts;
}

/// Build the evaluator selected in configuration.
pub fn build_evaluator(config: &ValidationConfig) -> Arc<dyn ValidationEvaluator> {
    let mock = MockEvaluator::new(config.jitter_pct, config.seed);
    match config.evaluator {
        EvaluatorKind::Mock => Arc::new(mock),
        EvaluatorKind::Rules => Arc::new(
            EntryRulesEvaluator::new(Box::new(mock))
                .with_blocklist(config.blocklist.iter().map(String::as_str))
                .with_do_not_disturb(config.do_not_disturb.iter().map(String::as_str)),
        ),
    }
}

// ─── Mock ───────────────────────────────────────────────────────────────────

/// Placeholder evaluator: every category is a fixed share of the total,
/// optionally perturbed by seeded jitter.
#[derive(Debug, Clone)]
pub struct MockEvaluator {
    jitter_pct: f64,
    seed: u64,
}

impl Default for MockEvaluator {
    fn default() -> Self {
        Self::new(0.0, 0)
    }
}

impl MockEvaluator {
    pub fn new(jitter_pct: f64, seed: u64) -> Self {
        Self {
            jitter_pct: jitter_pct.clamp(0.0, 1.0),
            seed,
        }
    }

    /// Share of the total, in basis points.
    pub fn basis_points(category: ValidationCategory) -> u64 {
        match category {
            ValidationCategory::Invalid => 500,
            ValidationCategory::Blacklist => 200,
            ValidationCategory::Duplicate => 300,
            ValidationCategory::DoNotDisturb => 400,
            ValidationCategory::OverLength => 100,
            ValidationCategory::HasSecondaryChannel => 6000,
            ValidationCategory::WithoutSecondaryChannel => 1000,
            ValidationCategory::InconsistentAddress => 200,
            ValidationCategory::PostalCodeMismatch => 150,
            ValidationCategory::MissingStreetNumber => 100,
        }
    }

    fn count(&self, total: u64, channel: Channel, category: ValidationCategory) -> u64 {
        let base = (u128::from(total) * u128::from(Self::basis_points(category)) / 10_000) as u64;
        if self.jitter_pct == 0.0 || base == 0 {
            return base;
        }

        let stream = self
            .seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add((channel as u64) << 32)
            .wrapping_add(category as u64)
            ^ total;
        let mut rng = StdRng::seed_from_u64(stream);
        let factor = 1.0 + rng.gen_range(-self.jitter_pct..=self.jitter_pct);
        ((base as f64 * factor).round() as u64).min(total)
    }
}

impl ValidationEvaluator for MockEvaluator {
    fn evaluate(&self, recipients: &RecipientPool<'_>, channel: Channel) -> ValidationCounts {
        let total = recipients.total;
        ValidationCategory::evaluated_for(channel).fold(
            ValidationCounts::new(total),
            |counts, category| {
                let count = self.count(total, channel, category);
                counts.with(category, count)
            },
        )
    }
}

// ─── Entry rules ────────────────────────────────────────────────────────────

/// Evaluates the entered recipient records.
///
/// Postal-code/region mismatches need reference data this evaluator does not
/// have, and over-length depends on content rather than recipients; both
/// report zero.
pub struct EntryRulesEvaluator {
    blocklist: HashSet<String>,
    do_not_disturb: HashSet<String>,
    fallback: Box<dyn ValidationEvaluator>,
}

impl EntryRulesEvaluator {
    pub fn new(fallback: Box<dyn ValidationEvaluator>) -> Self {
        Self {
            blocklist: HashSet::new(),
            do_not_disturb: HashSet::new(),
            fallback,
        }
    }

    pub fn with_blocklist<'a>(mut self, identifiers: impl IntoIterator<Item = &'a str>) -> Self {
        self.blocklist
            .extend(identifiers.into_iter().map(normalize_identifier));
        self
    }

    pub fn with_do_not_disturb<'a>(
        mut self,
        identifiers: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.do_not_disturb
            .extend(identifiers.into_iter().map(normalize_identifier));
        self
    }

    fn listed(&self, set: &HashSet<String>, entry: &RecipientEntry) -> bool {
        [&entry.email, &entry.phone]
            .iter()
            .filter(|v| !v.trim().is_empty())
            .any(|v| set.contains(&normalize_identifier(v)))
    }
}

impl ValidationEvaluator for EntryRulesEvaluator {
    fn evaluate(&self, recipients: &RecipientPool<'_>, channel: Channel) -> ValidationCounts {
        if !recipients.is_itemized() {
            debug!(
                channel = %channel,
                total = recipients.total,
                entries = recipients.entries.len(),
                "Recipients not itemized, using fallback evaluator"
            );
            return self.fallback.evaluate(recipients, channel);
        }

        let carried: HashSet<ValidationCategory> =
            ValidationCategory::evaluated_for(channel).collect();
        let mut counts = ValidationCounts::new(recipients.total);
        let mut bump = |category: ValidationCategory| {
            if carried.contains(&category) {
                *counts.counts.entry(category).or_insert(0) += 1;
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        for entry in recipients.entries {
            let Some(contact) = primary_contact(entry, channel) else {
                bump(ValidationCategory::Invalid);
                continue;
            };
            if !seen.insert(contact) {
                bump(ValidationCategory::Duplicate);
                continue;
            }

            // each entry lands in at most one category
            if self.listed(&self.blocklist, entry) {
                bump(ValidationCategory::Blacklist);
                continue;
            }
            if self.listed(&self.do_not_disturb, entry) {
                bump(ValidationCategory::DoNotDisturb);
                continue;
            }

            if channel.has_secondary_channel_concept() {
                if is_valid_email(&entry.email) {
                    bump(ValidationCategory::HasSecondaryChannel);
                } else {
                    bump(ValidationCategory::WithoutSecondaryChannel);
                }
            }

            if channel.is_postal() {
                let parts = entry
                    .address
                    .split(',')
                    .filter(|p| !p.trim().is_empty())
                    .count();
                if !entry.address.chars().any(|c| c.is_ascii_digit()) {
                    bump(ValidationCategory::MissingStreetNumber);
                } else if parts < 2 {
                    bump(ValidationCategory::InconsistentAddress);
                }
            }
        }

        for category in carried {
            counts.counts.entry(category).or_insert(0);
        }
        counts
    }
}

/// The normalized contact a channel delivers to, or `None` when missing or
/// malformed.
fn primary_contact(entry: &RecipientEntry, channel: Channel) -> Option<String> {
    match channel {
        Channel::Email => is_valid_email(&entry.email).then(|| normalize_identifier(&entry.email)),
        Channel::Sms | Channel::Whatsapp | Channel::Rcs => {
            is_valid_phone(&entry.phone).then(|| normalize_identifier(&entry.phone))
        }
        Channel::Letter => {
            let address = entry.address.trim();
            (!address.is_empty()).then(|| address.to_lowercase())
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !email.contains(char::is_whitespace)
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let mut count = 0;
    for c in digits.chars() {
        match c {
            '0'..='9' => count += 1,
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&count)
}

/// Lowercased email, or phone reduced to `+` and digits.
fn normalize_identifier(value: &str) -> String {
    let value = value.trim();
    if value.contains('@') {
        value.to_lowercase()
    } else {
        value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::{approved_count, ValidationToggleSet};
    use crate::recipients::{RecipientInput, RecipientList};

    fn list(rows: &str) -> RecipientList {
        let mut list = RecipientList::new();
        list.bulk_paste(rows);
        list
    }

    #[test]
    fn test_mock_fixed_fractions() {
        let counts = MockEvaluator::default().evaluate(&RecipientPool::counted(1000), Channel::Email);
        assert_eq!(counts.total, 1000);
        assert_eq!(counts.get(ValidationCategory::Invalid), 50);
        assert_eq!(counts.get(ValidationCategory::Blacklist), 20);
        assert_eq!(counts.get(ValidationCategory::Duplicate), 30);
        assert_eq!(counts.get(ValidationCategory::DoNotDisturb), 40);
        // email does not carry letter categories
        assert_eq!(counts.get(ValidationCategory::MissingStreetNumber), 0);
        assert!(!counts.counts.contains_key(&ValidationCategory::MissingStreetNumber));
    }

    #[test]
    fn test_mock_jitter_is_deterministic_and_bounded() {
        let evaluator = MockEvaluator::new(0.5, 7);
        let pool = RecipientPool::counted(10_000);
        let a = evaluator.evaluate(&pool, Channel::Sms);
        let b = evaluator.evaluate(&pool, Channel::Sms);
        assert_eq!(a, b);
        for (&category, &count) in &a.counts {
            let base = 10_000 * MockEvaluator::basis_points(category) / 10_000;
            assert!(count as f64 >= base as f64 * 0.5 - 1.0);
            assert!(count as f64 <= base as f64 * 1.5 + 1.0);
            assert!(count <= 10_000);
        }
    }

    #[test]
    fn test_mock_zero_total() {
        let counts = MockEvaluator::new(0.3, 1).evaluate(&RecipientPool::counted(0), Channel::Letter);
        assert!(counts.counts.values().all(|&c| c == 0));
    }

    #[test]
    fn test_rules_email() {
        let list = list(
            "Ana,ana@example.com\n\
             Ana again,ANA@example.com\n\
             Ben,not-an-email\n\
             Cy,cy@example.com\n\
             Di,di@example.com",
        );
        let evaluator = EntryRulesEvaluator::new(Box::new(MockEvaluator::default()))
            .with_blocklist(["cy@example.com"])
            .with_do_not_disturb(["di@example.com"]);
        let counts = evaluator.evaluate(&RecipientPool::from_entries(list.entries()), Channel::Email);

        assert_eq!(counts.total, 5);
        assert_eq!(counts.get(ValidationCategory::Invalid), 1);
        assert_eq!(counts.get(ValidationCategory::Duplicate), 1);
        assert_eq!(counts.get(ValidationCategory::Blacklist), 1);
        assert_eq!(counts.get(ValidationCategory::DoNotDisturb), 1);
    }

    #[test]
    fn test_rules_sms_secondary_channel() {
        let list = list(
            "A,a@example.com,+34 600 111 222\n\
             B,,600-333-444\n\
             C,c@example.com,\n\
             D,,+34 600 111 222",
        );
        let evaluator = EntryRulesEvaluator::new(Box::new(MockEvaluator::default()))
            .with_blocklist(["600 333 444"]);
        let counts = evaluator.evaluate(&RecipientPool::from_entries(list.entries()), Channel::Sms);

        assert_eq!(counts.get(ValidationCategory::Invalid), 1); // C has no phone
        assert_eq!(counts.get(ValidationCategory::Duplicate), 1); // D repeats A's phone
        assert_eq!(counts.get(ValidationCategory::HasSecondaryChannel), 1);
        // B is blacklisted, so it is not also counted as lacking an email
        assert_eq!(counts.get(ValidationCategory::WithoutSecondaryChannel), 0);
        assert_eq!(counts.get(ValidationCategory::Blacklist), 1);
        assert!(counts.counts.contains_key(&ValidationCategory::OverLength));
    }

    #[test]
    fn test_rules_count_each_entry_once() {
        let list = list("Ana,ana@x.com,600 111 222\nDee,,600 999 888");
        let evaluator = EntryRulesEvaluator::new(Box::new(MockEvaluator::default()))
            .with_blocklist(["600 999 888"])
            .with_do_not_disturb(["600 999 888"]);
        let counts = evaluator.evaluate(&RecipientPool::from_entries(list.entries()), Channel::Sms);

        assert_eq!(counts.get(ValidationCategory::Blacklist), 1);
        assert_eq!(counts.get(ValidationCategory::DoNotDisturb), 0);
        assert_eq!(counts.get(ValidationCategory::HasSecondaryChannel), 1);
        assert_eq!(counts.get(ValidationCategory::WithoutSecondaryChannel), 0);
        let flagged: u64 = counts.counts.values().sum();
        assert!(flagged <= counts.total);

        let toggles = ValidationToggleSet::defaults(Channel::Sms);
        assert_eq!(approved_count(&counts, &toggles), 1);
    }

    #[test]
    fn test_rules_letter_defects() {
        let mut list = RecipientList::new();
        for address in ["Main St 5, 28001 Madrid", "Main Street, Madrid", "Elm 3", ""] {
            list.add(RecipientInput {
                name: "x".to_string(),
                address: address.to_string(),
                ..Default::default()
            })
            .unwrap();
        }
        let evaluator = EntryRulesEvaluator::new(Box::new(MockEvaluator::default()));
        let counts = evaluator.evaluate(&RecipientPool::from_entries(list.entries()), Channel::Letter);

        assert_eq!(counts.get(ValidationCategory::Invalid), 1);
        assert_eq!(counts.get(ValidationCategory::MissingStreetNumber), 1);
        assert_eq!(counts.get(ValidationCategory::InconsistentAddress), 1);
        assert_eq!(counts.get(ValidationCategory::PostalCodeMismatch), 0);
    }

    #[test]
    fn test_rules_fall_back_when_not_itemized() {
        let evaluator = EntryRulesEvaluator::new(Box::new(MockEvaluator::default()));
        let counts = evaluator.evaluate(&RecipientPool::counted(2000), Channel::Email);
        assert_eq!(counts.get(ValidationCategory::Invalid), 100);
    }

    #[test]
    fn test_build_evaluator_from_config() {
        let config = ValidationConfig {
            evaluator: EvaluatorKind::Rules,
            blocklist: vec!["x@example.com".to_string()],
            ..Default::default()
        };
        let evaluator = build_evaluator(&config);
        let list = list("X,x@example.com");
        let counts = evaluator.evaluate(&RecipientPool::from_entries(list.entries()), Channel::Email);
        assert_eq!(counts.get(ValidationCategory::Blacklist), 1);
    }

    #[test]
    fn test_phone_and_email_syntax() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(!is_valid_phone("123"));
        assert!(!is_valid_phone("555-CALL-NOW"));
        assert!(is_valid_email("a.b@example.co"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
