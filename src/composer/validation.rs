//! Draft validity checks.

use std::fmt;

use alloy_primitives::Address;
use serde::Serialize;
use thiserror::Error;

use super::draft::DraftDestination;
use crate::allocation::{total_weight, BPS_DENOMINATOR, MAX_CURATOR_FEE_BPS, MAX_DESTINATIONS};

/// Raised only when a draft is turned into ledger call parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Invalid draft: {0}")]
    InvalidDraft(DraftReport),
}

/// Field-level validity of a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReport {
    /// Name is empty after trimming
    pub name_missing: bool,
    /// Sum of all weights in bps
    pub weight_total: u64,
    /// Fewer than one or more than ten destinations
    pub destination_count_invalid: bool,
    pub fee_out_of_range: bool,
    /// Rows whose recipient is not a valid address
    pub invalid_recipients: Vec<usize>,
    /// Rows whose label is empty after trimming
    pub missing_labels: Vec<usize>,
}

impl DraftReport {
    pub fn check(destinations: &[DraftDestination], name: &str, fee_bps: u32) -> Self {
        let weights: Vec<u32> = destinations.iter().map(|d| d.weight_bps).collect();

        Self {
            name_missing: name.trim().is_empty(),
            weight_total: total_weight(&weights),
            destination_count_invalid: destinations.is_empty()
                || destinations.len() > MAX_DESTINATIONS,
            fee_out_of_range: fee_bps > MAX_CURATOR_FEE_BPS,
            invalid_recipients: destinations
                .iter()
                .enumerate()
                .filter(|(_, d)| !is_valid_recipient(&d.recipient))
                .map(|(i, _)| i)
                .collect(),
            missing_labels: destinations
                .iter()
                .enumerate()
                .filter(|(_, d)| d.label.trim().is_empty())
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub fn weights_valid(&self) -> bool {
        self.weight_total == u64::from(BPS_DENOMINATOR)
    }

    pub fn is_submittable(&self) -> bool {
        !self.name_missing
            && self.weights_valid()
            && !self.destination_count_invalid
            && !self.fee_out_of_range
            && self.invalid_recipients.is_empty()
            && self.missing_labels.is_empty()
    }
}

impl fmt::Display for DraftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut problems = Vec::new();
        if self.name_missing {
            problems.push("name is required".to_string());
        }
        if !self.weights_valid() {
            problems.push(format!(
                "weights sum to {} bps, expected {BPS_DENOMINATOR}",
                self.weight_total
            ));
        }
        if self.destination_count_invalid {
            problems.push(format!("between 1 and {MAX_DESTINATIONS} destinations required"));
        }
        if self.fee_out_of_range {
            problems.push(format!("curator fee above {MAX_CURATOR_FEE_BPS} bps"));
        }
        if !self.invalid_recipients.is_empty() {
            problems.push(format!("invalid recipients at {:?}", self.invalid_recipients));
        }
        if !self.missing_labels.is_empty() {
            problems.push(format!("missing labels at {:?}", self.missing_labels));
        }

        if problems.is_empty() {
            f.write_str("ok")
        } else {
            f.write_str(&problems.join("; "))
        }
    }
}

/// True iff a draft with these rows, name and fee can be submitted.
pub fn is_submittable(destinations: &[DraftDestination], name: &str, fee_bps: u32) -> bool {
    DraftReport::check(destinations, name, fee_bps).is_submittable()
}

/// Parse a recipient typed by a curator.
///
/// `0x` followed by 40 hex digits. All-lowercase input is accepted as is;
/// any uppercase letter requires a valid EIP-55 checksum.
pub fn parse_recipient(input: &str) -> Option<Address> {
    let hex_part = input.strip_prefix("0x")?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    if hex_part.bytes().any(|b| b.is_ascii_uppercase()) {
        Address::parse_checksummed(input, None).ok()
    } else {
        input.parse().ok()
    }
}

pub fn is_valid_recipient(input: &str) -> bool {
    parse_recipient(input).is_some()
}
