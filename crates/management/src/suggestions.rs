//! Name autocomplete backed by recently created campaigns.

use campaign_core::CampaignResult;
use tracing::{debug, warn};

use crate::models::CampaignSummary;
use crate::requests::{RequestGenerations, RequestToken};

/// Trait for querying previously created campaigns, newest first.
pub trait CampaignDirectory: Send + Sync {
    fn recent_campaigns(&self, limit: usize) -> CampaignResult<Vec<CampaignSummary>>;
}

/// Cached recent campaigns plus substring matching against the name field.
#[derive(Debug, Default)]
pub struct NameSuggester {
    cache: Option<Vec<CampaignSummary>>,
    generations: RequestGenerations<()>,
    max_suggestions: usize,
}

impl NameSuggester {
    pub fn new(max_suggestions: usize) -> Self {
        Self {
            cache: None,
            generations: RequestGenerations::new(),
            max_suggestions,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    pub fn begin_fetch(&mut self) -> RequestToken<()> {
        self.generations.issue(())
    }

    /// Store a fetch result. Stale results are dropped, failures leave the
    /// cache untouched. Returns whether the cache was replaced.
    pub fn finish_fetch(
        &mut self,
        token: &RequestToken<()>,
        result: CampaignResult<Vec<CampaignSummary>>,
    ) -> bool {
        if !self.generations.is_current(token) {
            debug!(generation = token.generation, "Discarding stale suggestion fetch");
            return false;
        }
        match result {
            Ok(summaries) => {
                debug!(count = summaries.len(), "Suggestion cache refreshed");
                self.cache = Some(summaries);
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch campaign suggestions");
                false
            }
        }
    }

    /// Synchronous fetch-and-store against `directory`.
    pub fn refresh(&mut self, directory: &dyn CampaignDirectory, fetch_size: usize) -> bool {
        let token = self.begin_fetch();
        let result = directory.recent_campaigns(fetch_size);
        self.finish_fetch(&token, result)
    }

    /// Drop the cache and any outstanding fetch.
    pub fn invalidate(&mut self) {
        self.cache = None;
        self.generations.invalidate(&());
    }

    /// Cached campaigns whose name contains `query`, case-insensitively.
    pub fn suggest(&self, query: &str) -> Vec<CampaignSummary> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.cache
            .iter()
            .flatten()
            .filter(|s| s.name.to_lowercase().contains(&query))
            .take(self.max_suggestions)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::CampaignError;
    use chrono::Utc;

    fn summary(name: &str) -> CampaignSummary {
        CampaignSummary {
            name: name.to_string(),
            cost_center: "CC-100".to_string(),
            trigger_event: None,
            created_at: Utc::now(),
        }
    }

    struct FixedDirectory(Vec<CampaignSummary>);

    impl CampaignDirectory for FixedDirectory {
        fn recent_campaigns(&self, limit: usize) -> CampaignResult<Vec<CampaignSummary>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    #[test]
    fn test_substring_case_insensitive() {
        let mut suggester = NameSuggester::new(5);
        let directory = FixedDirectory(vec![
            summary("Spring Sale 2026"),
            summary("Black Friday"),
            summary("spring clearance"),
        ]);
        assert!(suggester.refresh(&directory, 20));

        let names: Vec<String> = suggester.suggest("SPRING").into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Spring Sale 2026", "spring clearance"]);
        assert!(suggester.suggest("   ").is_empty());
        assert!(suggester.suggest("winter").is_empty());
    }

    #[test]
    fn test_limits() {
        let mut suggester = NameSuggester::new(2);
        let directory = FixedDirectory((0..10).map(|i| summary(&format!("Promo {i}"))).collect());
        suggester.refresh(&directory, 4);
        assert_eq!(suggester.suggest("promo").len(), 2);
    }

    #[test]
    fn test_stale_fetch_discarded() {
        let mut suggester = NameSuggester::new(5);
        let old = suggester.begin_fetch();
        let new = suggester.begin_fetch();

        assert!(suggester.finish_fetch(&new, Ok(vec![summary("Fresh")])));
        assert!(!suggester.finish_fetch(&old, Ok(vec![summary("Stale")])));
        assert_eq!(suggester.suggest("fresh").len(), 1);
        assert!(suggester.suggest("stale").is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_cache() {
        let mut suggester = NameSuggester::new(5);
        suggester.refresh(&FixedDirectory(vec![summary("Kept")]), 20);

        let token = suggester.begin_fetch();
        assert!(!suggester.finish_fetch(&token, Err(CampaignError::Persistence("down".to_string()))));
        assert_eq!(suggester.suggest("kept").len(), 1);
    }

    #[test]
    fn test_invalidate() {
        let mut suggester = NameSuggester::new(5);
        let pending = suggester.begin_fetch();
        suggester.invalidate();
        assert!(!suggester.is_loaded());
        assert!(!suggester.finish_fetch(&pending, Ok(vec![summary("Late")])));
        assert!(!suggester.is_loaded());
    }
}
