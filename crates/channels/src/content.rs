//! Channel-agnostic view over the per-channel content blocks.
//!
//! The content step never blocks navigation; problems surface as
//! [`ContentWarning`]s on the review preview instead.

use campaign_core::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::email::EmailContent;
use crate::letter::LetterContent;
use crate::rcs::{self, RcsContent};
use crate::sms::{self, SmsContent};
use crate::whatsapp::{self, WhatsappContent};

/// When a channel's message goes out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SendTiming {
    #[default]
    Immediate,
    At { at: DateTime<Utc> },
}

/// Content for one channel, tagged by channel on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum ChannelContent {
    Email(EmailContent),
    Sms(SmsContent),
    Whatsapp(WhatsappContent),
    Rcs(RcsContent),
    Letter(LetterContent),
}

/// Limits applied when computing content warnings.
#[derive(Debug, Clone, Copy)]
pub struct ContentLimits {
    pub sms_max_segments: u32,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self { sms_max_segments: 3 }
    }
}

/// A soft issue with a content block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentWarning {
    pub channel: Channel,
    pub field: String,
    pub message: String,
}

impl ContentWarning {
    fn new(channel: Channel, field: &str, message: impl Into<String>) -> Self {
        Self {
            channel,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ChannelContent {
    /// An empty block for `channel`.
    pub fn empty(channel: Channel) -> Self {
        match channel {
            Channel::Email => ChannelContent::Email(EmailContent::default()),
            Channel::Sms => ChannelContent::Sms(SmsContent::default()),
            Channel::Whatsapp => ChannelContent::Whatsapp(WhatsappContent::default()),
            Channel::Rcs => ChannelContent::Rcs(RcsContent::default()),
            Channel::Letter => ChannelContent::Letter(LetterContent::default()),
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            ChannelContent::Email(_) => Channel::Email,
            ChannelContent::Sms(_) => Channel::Sms,
            ChannelContent::Whatsapp(_) => Channel::Whatsapp,
            ChannelContent::Rcs(_) => Channel::Rcs,
            ChannelContent::Letter(_) => Channel::Letter,
        }
    }

    pub fn timing(&self) -> SendTiming {
        match self {
            ChannelContent::Email(c) => c.timing,
            ChannelContent::Sms(c) => c.timing,
            ChannelContent::Whatsapp(c) => c.timing,
            ChannelContent::Rcs(c) => c.timing,
            ChannelContent::Letter(c) => c.timing,
        }
    }

    /// Whether the body would be split beyond `max_segments` SMS parts.
    /// Only SMS and RCS with SMS fallback can be over-length.
    pub fn is_over_length(&self, max_segments: u32) -> bool {
        match self {
            ChannelContent::Sms(c) => sms::calculate_segments(&c.body) > max_segments,
            ChannelContent::Rcs(c) => {
                c.sms_fallback && sms::calculate_segments(&c.body) > max_segments
            }
            _ => false,
        }
    }

    pub fn warnings(&self, limits: &ContentLimits) -> Vec<ContentWarning> {
        let channel = self.channel();
        let mut warnings = Vec::new();

        match self {
            ChannelContent::Email(c) => {
                if c.subject.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "subject", "Subject is empty"));
                }
                if c.sender_address.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "sender_address", "Sender address is empty"));
                } else if !c.sender_address.contains('@') {
                    warnings.push(ContentWarning::new(
                        channel,
                        "sender_address",
                        "Sender address does not look like an email address",
                    ));
                }
                if c.body_html.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "body_html", "Body is empty"));
                }
            }
            ChannelContent::Sms(c) => {
                if c.body.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "body", "Message is empty"));
                }
                let info = c.segment_info();
                if info.segments > limits.sms_max_segments {
                    let encoding = match info.encoding {
                        sms::SmsEncoding::Gsm7 => "GSM-7",
                        sms::SmsEncoding::Ucs2 => "UCS-2",
                    };
                    warnings.push(ContentWarning::new(
                        channel,
                        "body",
                        format!(
                            "Message spans {} {encoding} segments (limit {})",
                            info.segments, limits.sms_max_segments
                        ),
                    ));
                }
            }
            ChannelContent::Whatsapp(c) => {
                if c.template_name.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "template_name", "No template selected"));
                }
                if c.body.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "body", "Message is empty"));
                }
                if c.buttons.len() > whatsapp::MAX_BUTTONS {
                    warnings.push(ContentWarning::new(
                        channel,
                        "buttons",
                        format!("At most {} buttons are allowed", whatsapp::MAX_BUTTONS),
                    ));
                }
            }
            ChannelContent::Rcs(c) => {
                if c.agent_id.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "agent_id", "No RCS agent selected"));
                }
                if c.body.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "body", "Message is empty"));
                }
                if c.suggestions.len() > rcs::MAX_SUGGESTIONS {
                    warnings.push(ContentWarning::new(
                        channel,
                        "suggestions",
                        format!("At most {} suggestions are allowed", rcs::MAX_SUGGESTIONS),
                    ));
                }
                if self.is_over_length(limits.sms_max_segments) {
                    warnings.push(ContentWarning::new(
                        channel,
                        "body",
                        "SMS fallback exceeds the segment limit",
                    ));
                }
            }
            ChannelContent::Letter(c) => {
                if c.body.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "body", "Letter body is empty"));
                }
                if c.return_address.trim().is_empty() {
                    warnings.push(ContentWarning::new(channel, "return_address", "Return address is empty"));
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_block_matches_channel() {
        for channel in Channel::ALL {
            assert_eq!(ChannelContent::empty(channel).channel(), channel);
            assert_eq!(ChannelContent::empty(channel).timing(), SendTiming::Immediate);
        }
    }

    #[test]
    fn test_tagged_serde() {
        let json = r#"{"channel": "sms", "sender_id": "ACME", "body": "Hi",
                       "timing": {"mode": "at", "at": "2026-11-01T09:00:00Z"}}"#;
        let content: ChannelContent = serde_json::from_str(json).unwrap();
        match &content {
            ChannelContent::Sms(sms) => {
                assert_eq!(sms.sender_id, "ACME");
                assert_eq!(
                    sms.timing,
                    SendTiming::At { at: Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap() }
                );
            }
            other => panic!("unexpected content {other:?}"),
        }

        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["channel"], "sms");
    }

    #[test]
    fn test_empty_email_warnings() {
        let warnings = ChannelContent::empty(Channel::Email).warnings(&ContentLimits::default());
        let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["subject", "sender_address", "body_html"]);
    }

    #[test]
    fn test_complete_email_has_no_warnings() {
        let content = ChannelContent::Email(EmailContent {
            subject: "Hello".to_string(),
            sender_address: "news@example.com".to_string(),
            body_html: "<p>Hi</p>".to_string(),
            ..Default::default()
        });
        assert!(content.warnings(&ContentLimits::default()).is_empty());
    }

    #[test]
    fn test_sms_over_length() {
        let content = ChannelContent::Sms(SmsContent {
            sender_id: "ACME".to_string(),
            body: "a".repeat(153 * 3 + 1),
            timing: SendTiming::Immediate,
        });
        assert!(content.is_over_length(3));
        assert!(!content.is_over_length(4));

        let warnings = content.warnings(&ContentLimits { sms_max_segments: 3 });
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("4 GSM-7 segments"));

        // a single non-GSM character switches the whole body to UCS-2
        let content = ChannelContent::Sms(SmsContent {
            sender_id: "ACME".to_string(),
            body: format!("{}€✓", "a".repeat(200)),
            timing: SendTiming::Immediate,
        });
        let warnings = content.warnings(&ContentLimits { sms_max_segments: 3 });
        assert!(warnings[0].message.contains("4 UCS-2 segments"));
    }

    #[test]
    fn test_rcs_over_length_only_with_fallback() {
        let mut rcs = RcsContent {
            agent_id: "agent".to_string(),
            body: "a".repeat(400),
            ..Default::default()
        };
        assert!(ChannelContent::Rcs(rcs.clone()).is_over_length(2));
        rcs.sms_fallback = false;
        assert!(!ChannelContent::Rcs(rcs).is_over_length(2));
    }

    #[test]
    fn test_letter_never_over_length() {
        let content = ChannelContent::Letter(LetterContent {
            body: "x".repeat(10_000),
            ..Default::default()
        });
        assert!(!content.is_over_length(1));
    }
}
