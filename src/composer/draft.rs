//! In-memory strategy draft and its edit operations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::validation::{parse_recipient, DraftError, DraftReport};
use crate::allocation::{normalize, total_weight, MAX_DESTINATIONS};
use crate::ledger::CreateStrategyCall;
use crate::strategy::{Destination, StrategyMetadata};

/// Fee a fresh draft starts with (2%).
pub const DEFAULT_CURATOR_FEE_BPS: u32 = 200;

/// One destination row being edited. Any field may be invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftDestination {
    /// Raw recipient input, checked only by validation
    pub recipient: String,
    pub weight_bps: u32,
    pub label: String,
}

impl DraftDestination {
    pub fn new(recipient: impl Into<String>, weight_bps: u32, label: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            weight_bps,
            label: label.into(),
        }
    }
}

/// A single-field edit of one destination row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationField {
    Recipient(String),
    WeightBps(u32),
    Label(String),
}

/// An unpublished strategy being authored.
///
/// Mutations never validate, so an invalid draft stays editable. Use
/// [`StrategyDraft::validate`] to query validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyDraft {
    pub name: String,
    pub description: String,
    pub curator_fee_bps: u32,
    pub destinations: Vec<DraftDestination>,
}

impl Default for StrategyDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            curator_fee_bps: DEFAULT_CURATOR_FEE_BPS,
            destinations: vec![
                DraftDestination::new("", 5_000, ""),
                DraftDestination::new("", 5_000, ""),
            ],
        }
    }
}

impl StrategyDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty row. Returns false (no-op) at the destination cap.
    pub fn add_destination(&mut self) -> bool {
        if self.destinations.len() >= MAX_DESTINATIONS {
            debug!(count = self.destinations.len(), "Destination cap reached");
            return false;
        }
        self.destinations.push(DraftDestination::default());
        true
    }

    /// Remove one row. Returns false (no-op) for the last remaining row or an
    /// index out of range.
    pub fn remove_destination(&mut self, index: usize) -> bool {
        if self.destinations.len() <= 1 || index >= self.destinations.len() {
            return false;
        }
        self.destinations.remove(index);
        true
    }

    /// Replace one field of one row. Returns false for an index out of range.
    pub fn update_destination(&mut self, index: usize, field: DestinationField) -> bool {
        let Some(destination) = self.destinations.get_mut(index) else {
            return false;
        };
        match field {
            DestinationField::Recipient(recipient) => destination.recipient = recipient,
            DestinationField::WeightBps(weight) => destination.weight_bps = weight,
            DestinationField::Label(label) => destination.label = label,
        }
        true
    }

    pub fn weights(&self) -> Vec<u32> {
        self.destinations.iter().map(|d| d.weight_bps).collect()
    }

    pub fn total_weight(&self) -> u64 {
        total_weight(&self.weights())
    }

    /// Rescale the weights to sum to 10000 bps. No-op when they sum to 0.
    pub fn normalize_weights(&mut self) {
        let normalized = normalize(&self.weights());
        for (destination, weight) in self.destinations.iter_mut().zip(normalized) {
            destination.weight_bps = weight;
        }
    }

    /// Field-level validity of the whole draft.
    pub fn validate(&self) -> DraftReport {
        DraftReport::check(&self.destinations, &self.name, self.curator_fee_bps)
    }

    pub fn is_submittable(&self) -> bool {
        self.validate().is_submittable()
    }

    pub fn metadata(&self) -> StrategyMetadata {
        StrategyMetadata::new(self.name.trim(), self.description.trim())
    }

    pub fn metadata_uri(&self) -> String {
        self.metadata().to_uri()
    }

    /// Build the `createStrategy` parameters from a valid draft.
    pub fn to_create_call(&self) -> Result<CreateStrategyCall, DraftError> {
        let report = self.validate();
        if !report.is_submittable() {
            return Err(DraftError::InvalidDraft(report));
        }

        let destinations = self
            .destinations
            .iter()
            .map(|d| {
                parse_recipient(&d.recipient).map(|recipient| Destination {
                    recipient,
                    weight_bps: d.weight_bps,
                    label: d.label.trim().to_string(),
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| DraftError::InvalidDraft(report.clone()))?;

        Ok(CreateStrategyCall {
            name: self.name.trim().to_string(),
            metadata_uri: self.metadata_uri(),
            curator_fee_bps: self.curator_fee_bps,
            destinations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
    const BOB: &str = "0x8617E340B3D01FA5F11F306F4090FD50E238070D";
    const CAROL: &str = "0xde709f2102306220921060314715629080e2fb77";

    fn filled_draft() -> StrategyDraft {
        StrategyDraft {
            name: "Client diversity".to_string(),
            description: "Minority clients".to_string(),
            curator_fee_bps: 250,
            destinations: vec![
                DraftDestination::new(ALICE, 6_000, "Lighthouse"),
                DraftDestination::new(CAROL, 3_000, "Nimbus"),
            ],
        }
    }

    // =========================================================================
    // Edit operations
    // =========================================================================

    #[test]
    fn test_default_draft() {
        let draft = StrategyDraft::new();
        assert_eq!(draft.curator_fee_bps, 200);
        assert_eq!(draft.weights(), vec![5_000, 5_000]);
        assert!(!draft.is_submittable());
    }

    #[test]
    fn test_add_destination_capped() {
        let mut draft = StrategyDraft::new();
        for _ in 0..8 {
            assert!(draft.add_destination());
        }
        assert_eq!(draft.destinations.len(), 10);

        assert!(!draft.add_destination());
        assert_eq!(draft.destinations.len(), 10);
    }

    #[test]
    fn test_remove_keeps_at_least_one() {
        let mut draft = StrategyDraft::new();
        assert!(!draft.remove_destination(5));
        assert!(draft.remove_destination(0));
        assert_eq!(draft.destinations.len(), 1);

        assert!(!draft.remove_destination(0));
        assert_eq!(draft.destinations.len(), 1);
    }

    #[test]
    fn test_update_does_not_validate() {
        let mut draft = StrategyDraft::new();
        assert!(draft.update_destination(0, DestinationField::Recipient("nope".into())));
        assert!(draft.update_destination(1, DestinationField::WeightBps(99_999)));
        assert!(draft.update_destination(1, DestinationField::Label("Docs".into())));
        assert!(!draft.update_destination(2, DestinationField::Label("x".into())));

        assert_eq!(draft.destinations[0].recipient, "nope");
        assert_eq!(draft.destinations[1].weight_bps, 99_999);
        assert_eq!(draft.destinations[1].label, "Docs");
    }

    #[test]
    fn test_normalize_zero_total_is_noop() {
        let mut draft = StrategyDraft::new();
        draft.update_destination(0, DestinationField::WeightBps(0));
        draft.update_destination(1, DestinationField::WeightBps(0));
        draft.normalize_weights();
        assert_eq!(draft.weights(), vec![0, 0]);
    }

    // =========================================================================
    // Submission
    // =========================================================================

    #[test]
    fn test_normalizing_makes_underweight_draft_submittable() {
        let mut draft = filled_draft();
        assert!(!draft.is_submittable());
        assert!(draft.validate().weight_total == 9_000);

        draft.normalize_weights();

        assert_eq!(draft.total_weight(), 10_000);
        assert_eq!(draft.weights(), vec![6_667, 3_333]);
        assert!(draft.is_submittable());
    }

    #[test]
    fn test_to_create_call() {
        let mut draft = filled_draft();
        draft.destinations[1].weight_bps = 4_000;
        draft.destinations[1].label = "  Nimbus ".to_string();
        draft.name = " Client diversity ".to_string();

        let call = draft.to_create_call().unwrap();

        assert_eq!(call.name, "Client diversity");
        assert_eq!(call.curator_fee_bps, 250);
        assert_eq!(call.destinations.len(), 2);
        assert_eq!(call.destinations[1].label, "Nimbus");
        assert_eq!(
            StrategyMetadata::from_uri(&call.metadata_uri),
            Some(StrategyMetadata::new("Client diversity", "Minority clients"))
        );
    }

    #[test]
    fn test_to_create_call_rejects_invalid_draft() {
        let mut draft = filled_draft();
        draft.destinations[1].weight_bps = 4_000;
        draft.destinations[0].recipient = BOB.to_lowercase().replace('8', "g");

        match draft.to_create_call() {
            Err(DraftError::InvalidDraft(report)) => {
                assert_eq!(report.invalid_recipients, vec![0]);
            }
            other => panic!("expected invalid draft, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_deserializes_with_defaults() {
        let json = r#"{
            "name": "Docs",
            "destinations": [
                { "recipient": "0x52908400098527886e0f7030069857d2e4169ee7", "weightBps": 10000, "label": "Writers" }
            ]
        }"#;

        let draft: StrategyDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.curator_fee_bps, 200);
        assert_eq!(draft.description, "");
        assert!(draft.is_submittable());
    }
}
