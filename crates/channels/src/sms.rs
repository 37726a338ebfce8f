//! SMS content block and segment accounting.
//!
//! GSM 7-bit bodies fit 160 septets in one segment and 153 per segment once
//! concatenated (UDH overhead). Anything outside the GSM alphabet forces
//! UCS-2: 70 characters single, 67 per concatenated segment.

use serde::{Deserialize, Serialize};

use crate::content::SendTiming;

const GSM_SINGLE: u32 = 160;
const GSM_MULTI: u32 = 153;
const UCS2_SINGLE: u32 = 70;
const UCS2_MULTI: u32 = 67;

/// SMS message content collected by the wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmsContent {
    /// Alphanumeric sender id or short code shown on the handset.
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub timing: SendTiming,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SmsEncoding {
    Gsm7,
    Ucs2,
}

/// Length breakdown for an SMS body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentInfo {
    pub encoding: SmsEncoding,
    /// Septets for GSM 7-bit (extension characters count twice), characters for UCS-2.
    pub units: u32,
    pub segments: u32,
}

impl SmsContent {
    pub fn segment_info(&self) -> SegmentInfo {
        segment_info(&self.body)
    }
}

/// Calculate the number of SMS segments for a message body. An empty body
/// still occupies one segment.
pub fn calculate_segments(body: &str) -> u32 {
    segment_info(body).segments
}

pub fn segment_info(body: &str) -> SegmentInfo {
    let septets: Option<u32> = body.chars().try_fold(0u32, |acc, c| {
        gsm_septets(c).map(|n| acc + n)
    });

    match septets {
        Some(units) => SegmentInfo {
            encoding: SmsEncoding::Gsm7,
            units,
            segments: segments_for(units, GSM_SINGLE, GSM_MULTI),
        },
        None => {
            let units = body.chars().count() as u32;
            SegmentInfo {
                encoding: SmsEncoding::Ucs2,
                units,
                segments: segments_for(units, UCS2_SINGLE, UCS2_MULTI),
            }
        }
    }
}

fn segments_for(units: u32, single: u32, multi: u32) -> u32 {
    if units <= single {
        1
    } else {
        units.div_ceil(multi)
    }
}

/// Septets needed for `c` in the GSM 03.38 alphabet, `None` if it is not
/// representable.
fn gsm_septets(c: char) -> Option<u32> {
    if is_gsm_basic(c) {
        Some(1)
    } else if is_gsm_extension(c) {
        Some(2)
    } else {
        None
    }
}

fn is_gsm_basic(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z' | '0'..='9'
        | ' ' | '!' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')'
        | '*' | '+' | ',' | '-' | '.' | '/' | ':' | ';' | '<' | '='
        | '>' | '?' | '@' | '_' | '\n' | '\r'
        | '\u{00A3}' | '\u{00A5}' | '\u{00E8}' | '\u{00E9}' | '\u{00F9}'
        | '\u{00EC}' | '\u{00F2}' | '\u{00C7}' | '\u{00D8}' | '\u{00F8}'
        | '\u{00C5}' | '\u{00E5}' | '\u{0394}' | '\u{03A6}' | '\u{0393}'
        | '\u{039B}' | '\u{03A9}' | '\u{03A0}' | '\u{03A8}' | '\u{03A3}'
        | '\u{0398}' | '\u{039E}' | '\u{00C6}' | '\u{00E6}' | '\u{00DF}'
        | '\u{00C9}' | '\u{00A4}' | '\u{00A1}' | '\u{00BF}' | '\u{00C4}'
        | '\u{00D6}' | '\u{00D1}' | '\u{00DC}' | '\u{00A7}' | '\u{00E4}'
        | '\u{00F6}' | '\u{00F1}' | '\u{00FC}' | '\u{00E0}'
    )
}

/// Extension table characters: escape septet plus the character itself.
fn is_gsm_extension(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | '~' | '\\' | '^' | '|' | '\u{20AC}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_one_segment() {
        assert_eq!(calculate_segments(""), 1);
        assert_eq!(segment_info("").encoding, SmsEncoding::Gsm7);
    }

    #[test]
    fn test_gsm_boundaries() {
        assert_eq!(calculate_segments(&"a".repeat(160)), 1);
        // 161 septets -> 153 + 8
        assert_eq!(calculate_segments(&"a".repeat(161)), 2);
        assert_eq!(calculate_segments(&"a".repeat(306)), 2);
        assert_eq!(calculate_segments(&"a".repeat(307)), 3);
    }

    #[test]
    fn test_extension_characters_count_twice() {
        let info = segment_info(&"{".repeat(80));
        assert_eq!(info.encoding, SmsEncoding::Gsm7);
        assert_eq!(info.units, 160);
        assert_eq!(info.segments, 1);

        let info = segment_info(&format!("{}a", "€".repeat(80)));
        assert_eq!(info.units, 161);
        assert_eq!(info.segments, 2);
    }

    #[test]
    fn test_unicode_switches_to_ucs2() {
        let info = segment_info(&"ü".repeat(10));
        assert_eq!(info.encoding, SmsEncoding::Gsm7);

        let body = "日".repeat(70);
        let info = segment_info(&body);
        assert_eq!(info.encoding, SmsEncoding::Ucs2);
        assert_eq!(info.segments, 1);

        assert_eq!(calculate_segments(&"日".repeat(71)), 2);
        assert_eq!(calculate_segments(&"日".repeat(135)), 3);
    }

    #[test]
    fn test_single_emoji_forces_ucs2() {
        let body = format!("{} 🎉", "a".repeat(100));
        let info = segment_info(&body);
        assert_eq!(info.encoding, SmsEncoding::Ucs2);
        assert_eq!(info.units, 102);
        assert_eq!(info.segments, 2);
    }
}
