//! Email content block: envelope fields, HTML body and branded assets.

use serde::{Deserialize, Serialize};

use crate::content::SendTiming;

/// Image slots that can be filled by uploading a file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    Logo,
    Header,
    Footer,
}

impl AssetSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetSlot::Logo => "logo",
            AssetSlot::Header => "header",
            AssetSlot::Footer => "footer",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailContent {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub sender_address: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Preview text shown by mail clients next to the subject.
    #[serde(default)]
    pub preheader: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub header_url: Option<String>,
    #[serde(default)]
    pub footer_url: Option<String>,
    #[serde(default)]
    pub timing: SendTiming,
}

impl EmailContent {
    pub fn asset_url(&self, slot: AssetSlot) -> Option<&str> {
        match slot {
            AssetSlot::Logo => self.logo_url.as_deref(),
            AssetSlot::Header => self.header_url.as_deref(),
            AssetSlot::Footer => self.footer_url.as_deref(),
        }
    }

    pub fn set_asset_url(&mut self, slot: AssetSlot, url: String) {
        match slot {
            AssetSlot::Logo => self.logo_url = Some(url),
            AssetSlot::Header => self.header_url = Some(url),
            AssetSlot::Footer => self.footer_url = Some(url),
        }
    }
}
