//! Physical letter content and print/postage settings.

use serde::{Deserialize, Serialize};

use crate::content::SendTiming;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaperSize {
    #[default]
    A4,
    UsLetter,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PostageClass {
    #[default]
    Standard,
    Priority,
    Registered,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LetterContent {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub paper: PaperSize,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub duplex: bool,
    #[serde(default)]
    pub postage: PostageClass,
    #[serde(default)]
    pub return_address: String,
    #[serde(default)]
    pub timing: SendTiming,
}
