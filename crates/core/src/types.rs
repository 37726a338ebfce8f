use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CampaignError;

/// A communication medium a campaign can be sent through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
    Rcs,
    Letter,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Email,
        Channel::Sms,
        Channel::Whatsapp,
        Channel::Rcs,
        Channel::Letter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
            Channel::Rcs => "rcs",
            Channel::Letter => "letter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::Sms => "SMS",
            Channel::Whatsapp => "WhatsApp",
            Channel::Rcs => "RCS",
            Channel::Letter => "Letter",
        }
    }

    /// Phone-addressed channels, where a recipient may or may not also have
    /// an email address to fall back on.
    pub fn has_secondary_channel_concept(&self) -> bool {
        matches!(self, Channel::Sms | Channel::Whatsapp | Channel::Rcs)
    }

    /// Postal channel: no phone or email, addressed by street address.
    pub fn is_postal(&self) -> bool {
        matches!(self, Channel::Letter)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            "rcs" => Ok(Channel::Rcs),
            "letter" => Ok(Channel::Letter),
            other => Err(CampaignError::Validation(format!("unknown channel '{other}'"))),
        }
    }
}

/// How a campaign is assembled and sent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    /// One-off send to a hand-entered recipient list.
    QuickSend,
    /// Full campaign against an uploaded file or a stored list.
    Campaign,
    /// Event-triggered flow, built in the separate automation builder.
    Automation,
}

impl CampaignType {
    pub fn display_name(&self) -> &'static str {
        match self {
            CampaignType::QuickSend => "Quick Send",
            CampaignType::Campaign => "Campaign",
            CampaignType::Automation => "Automation",
        }
    }

    /// Quick sends skip cost-center attribution.
    pub fn requires_cost_center(&self) -> bool {
        !matches!(self, CampaignType::QuickSend)
    }
}

/// Status a campaign is persisted with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse_and_display() {
        for channel in Channel::ALL {
            let parsed: Channel = channel.as_str().parse().unwrap();
            assert_eq!(parsed, channel);
        }
        assert_eq!("WhatsApp".parse::<Channel>().unwrap(), Channel::Whatsapp);
        assert!("fax".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_serde_snake_case() {
        let json = serde_json::to_string(&Channel::Whatsapp).unwrap();
        assert_eq!(json, "\"whatsapp\"");
        let ty: CampaignType = serde_json::from_str("\"quick_send\"").unwrap();
        assert_eq!(ty, CampaignType::QuickSend);
    }

    #[test]
    fn test_secondary_channel_concept() {
        assert!(Channel::Sms.has_secondary_channel_concept());
        assert!(Channel::Rcs.has_secondary_channel_concept());
        assert!(!Channel::Email.has_secondary_channel_concept());
        assert!(!Channel::Letter.has_secondary_channel_concept());
        assert!(Channel::Letter.is_postal());
    }

    #[test]
    fn test_cost_center_requirement() {
        assert!(!CampaignType::QuickSend.requires_cost_center());
        assert!(CampaignType::Campaign.requires_cost_center());
        assert!(CampaignType::Automation.requires_cost_center());
    }
}
