//! Per-channel content blocks for campaign composition.
//!
//! Each channel (email, SMS, WhatsApp, RCS, letter) has its own block with
//! message content, send timing and channel-specific settings. Blocks are
//! independent of each other and composed by the wizard.

pub mod content;
pub mod email;
pub mod letter;
pub mod rcs;
pub mod sms;
pub mod whatsapp;

pub use content::{ChannelContent, ContentLimits, ContentWarning, SendTiming};
pub use email::{AssetSlot, EmailContent};
pub use letter::{LetterContent, PaperSize, PostageClass};
pub use rcs::RcsContent;
pub use sms::{calculate_segments, SegmentInfo, SmsContent, SmsEncoding};
pub use whatsapp::WhatsappContent;
