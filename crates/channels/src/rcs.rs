//! RCS rich card content with optional SMS fallback.

use serde::{Deserialize, Serialize};

use crate::content::SendTiming;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RcsContent {
    /// Verified RCS business agent the card is sent from.
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Suggested reply/action chips.
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Deliver the body as plain SMS to handsets without RCS support.
    #[serde(default = "default_sms_fallback")]
    pub sms_fallback: bool,
    #[serde(default)]
    pub timing: SendTiming,
}

/// RCS cards carry at most eleven suggestion chips.
pub const MAX_SUGGESTIONS: usize = 11;

fn default_sms_fallback() -> bool {
    true
}

impl Default for RcsContent {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            title: String::new(),
            body: String::new(),
            image_url: None,
            suggestions: Vec::new(),
            sms_fallback: default_sms_fallback(),
            timing: SendTiming::default(),
        }
    }
}
