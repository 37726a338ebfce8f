//! Quick-send recipient intake: single entries and bulk paste.
//!
//! Entries get a monotonic id from the owning list, so removing one never
//! changes the identity of the others.

use campaign_core::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};

/// Delimiters accepted between fields of a pasted row.
const BULK_DELIMITERS: [char; 3] = [',', ';', '\t'];

/// A manually entered recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientEntry {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Recipient fields as typed or pasted, before an id is assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl RecipientInput {
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.address]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

/// Ordered recipient list for a quick send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientList {
    entries: Vec<RecipientEntry>,
    next_id: u64,
}

impl Default for RecipientList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipientList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn entries(&self) -> &[RecipientEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a single entry. At least one field must be filled in.
    pub fn add(&mut self, input: RecipientInput) -> CampaignResult<RecipientEntry> {
        if input.is_blank() {
            return Err(CampaignError::Validation(
                "recipient needs at least one of name, email, phone or address".to_string(),
            ));
        }
        Ok(self.push(input))
    }

    /// Parse pasted rows and append them. Returns how many entries were added.
    /// Rows are not validated beyond dropping blank ones.
    pub fn bulk_paste(&mut self, text: &str) -> usize {
        let rows = parse_bulk(text);
        let added = rows.len();
        for row in rows {
            self.push(row);
        }
        added
    }

    pub fn remove(&mut self, index: usize) -> CampaignResult<RecipientEntry> {
        if index >= self.entries.len() {
            return Err(CampaignError::Validation(format!(
                "recipient index {index} out of range (list has {} entries)",
                self.entries.len()
            )));
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, input: RecipientInput) -> RecipientEntry {
        let entry = RecipientEntry {
            id: self.next_id,
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        entry
    }
}

/// Split pasted text into recipient rows.
///
/// Each non-blank line is split on comma, semicolon or tab and mapped
/// positionally to name, email, phone, address. Missing trailing fields stay
/// empty, surplus fields are ignored. A line of bare delimiters still yields
/// an (empty) row.
pub fn parse_bulk(text: &str) -> Vec<RecipientInput> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split(BULK_DELIMITERS).map(|f| f.trim().to_string());
            RecipientInput {
                name: fields.next().unwrap_or_default(),
                email: fields.next().unwrap_or_default(),
                phone: fields.next().unwrap_or_default(),
                address: fields.next().unwrap_or_default(),
            }
        })
        .collect()
}
