//! WhatsApp Business content: an approved template plus its rendered body.

use serde::{Deserialize, Serialize};

use crate::content::SendTiming;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhatsappContent {
    /// Name of the pre-approved message template.
    #[serde(default)]
    pub template_name: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub header_media_url: Option<String>,
    /// Quick-reply button labels.
    #[serde(default)]
    pub buttons: Vec<String>,
    #[serde(default)]
    pub timing: SendTiming,
}

/// WhatsApp allows at most three quick-reply buttons per template.
pub const MAX_BUTTONS: usize = 3;

fn default_language() -> String {
    "en".to_string()
}

impl Default for WhatsappContent {
    fn default() -> Self {
        Self {
            template_name: String::new(),
            language: default_language(),
            body: String::new(),
            header_media_url: None,
            buttons: Vec::new(),
            timing: SendTiming::default(),
        }
    }
}
