//! Request-generation tokens for discarding stale async responses.
//!
//! Every time a request of some kind is started a new token is issued for
//! that kind. When the response arrives it is only applied if its token is
//! still the latest one; a response to a superseded request is dropped.

use std::collections::HashMap;
use std::hash::Hash;

/// Identifies one in-flight request of kind `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken<K> {
    pub kind: K,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct RequestGenerations<K> {
    latest: HashMap<K, u64>,
}

impl<K> Default for RequestGenerations<K> {
    fn default() -> Self {
        Self {
            latest: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> RequestGenerations<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request of `kind`, superseding any earlier one of the same kind.
    pub fn issue(&mut self, kind: K) -> RequestToken<K> {
        let generation = self.latest.entry(kind.clone()).or_insert(0);
        *generation += 1;
        RequestToken {
            kind,
            generation: *generation,
        }
    }

    pub fn is_current(&self, token: &RequestToken<K>) -> bool {
        self.latest.get(&token.kind) == Some(&token.generation)
    }

    /// Supersede every outstanding request of `kind` without starting a new one.
    pub fn invalidate(&mut self, kind: &K) {
        if let Some(generation) = self.latest.get_mut(kind) {
            *generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_is_current() {
        let mut generations = RequestGenerations::new();
        let first = generations.issue("logo");
        assert!(generations.is_current(&first));

        let second = generations.issue("logo");
        assert!(!generations.is_current(&first));
        assert!(generations.is_current(&second));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut generations = RequestGenerations::new();
        let logo = generations.issue("logo");
        let _header = generations.issue("header");
        assert!(generations.is_current(&logo));
    }

    #[test]
    fn test_invalidate() {
        let mut generations = RequestGenerations::new();
        let token = generations.issue(());
        generations.invalidate(&());
        assert!(!generations.is_current(&token));
        let next = generations.issue(());
        assert!(generations.is_current(&next));
    }

    #[test]
    fn test_unknown_kind_not_current() {
        let generations: RequestGenerations<&str> = RequestGenerations::new();
        let forged = RequestToken { kind: "footer", generation: 1 };
        assert!(!generations.is_current(&forged));
    }
}
