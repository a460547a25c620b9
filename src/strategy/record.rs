//! `StrategyRecord` construction from raw ledger tuples.

use std::fmt;

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::metadata::StrategyMetadata;
use crate::allocation::bps_to_percent;
use crate::ledger::{RawDestination, RawStrategyInfo};

/// One funding recipient and its share weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub recipient: Address,
    /// Share in basis points, 0..=10000
    pub weight_bps: u32,
    /// May be empty in ledger data
    pub label: String,
}

impl Destination {
    pub fn weight_percent(&self) -> Decimal {
        bps_to_percent(self.weight_bps)
    }
}

/// Which half of a strategy read is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPart {
    Info,
    Destinations,
    Both,
}

impl fmt::Display for MissingPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPart::Info => write!(f, "info"),
            MissingPart::Destinations => write!(f, "destinations"),
            MissingPart::Both => write!(f, "info and destinations"),
        }
    }
}

/// Why raw ledger data could not become a `StrategyRecord`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Incomplete record for {address}: missing {missing}")]
    IncompleteRecord {
        address: Address,
        missing: MissingPart,
    },

    #[error("{field} of {address} does not fit its bounded type: {value}")]
    FieldOutOfRange {
        address: Address,
        field: &'static str,
        value: U256,
    },
}

/// A published strategy as observed in one ledger snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecord {
    /// Deployed strategy contract (primary key)
    pub address: Address,
    pub name: String,
    #[serde(rename = "metadataURI")]
    pub metadata_uri: String,
    pub curator: Address,
    /// Cut taken before distribution, 0..=1000
    pub curator_fee_bps: u32,
    /// Display order, also the tie-break order
    pub destinations: Vec<Destination>,
    /// Lifetime inbound value, full ledger width
    pub total_allocated: U256,
    /// Distinct funding accounts ever recorded
    pub total_donors: u64,
}

impl StrategyRecord {
    /// Assemble a record from both halves of a strategy read.
    ///
    /// Missing halves are reported, never defaulted. Bounded fields are
    /// narrowed without re-validating ledger invariants (weight totals,
    /// fee cap); a value too wide for its Rust type is an error.
    pub fn from_raw(
        address: Address,
        info: Option<RawStrategyInfo>,
        destinations: Option<Vec<RawDestination>>,
    ) -> Result<Self, RecordError> {
        let (info, destinations) = match (info, destinations) {
            (Some(info), Some(destinations)) => (info, destinations),
            (None, Some(_)) => return Err(incomplete(address, MissingPart::Info)),
            (Some(_), None) => return Err(incomplete(address, MissingPart::Destinations)),
            (None, None) => return Err(incomplete(address, MissingPart::Both)),
        };

        let destinations = destinations
            .into_iter()
            .map(|raw| {
                Ok(Destination {
                    recipient: raw.recipient,
                    weight_bps: narrow_u32(address, "weightBps", raw.weight_bps)?,
                    label: raw.label,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        Ok(Self {
            address,
            name: info.name,
            metadata_uri: info.metadata_uri,
            curator: info.curator,
            curator_fee_bps: narrow_u32(address, "curatorFeeBps", info.curator_fee_bps)?,
            destinations,
            total_allocated: info.total_allocated,
            total_donors: narrow_u64(address, "totalDonors", info.total_donors)?,
        })
    }

    /// Destination weights in display order.
    pub fn weights(&self) -> Vec<u32> {
        self.destinations.iter().map(|d| d.weight_bps).collect()
    }

    pub fn fee_percent(&self) -> Decimal {
        bps_to_percent(self.curator_fee_bps)
    }

    /// Name and description, when the metadata URI carries them inline.
    pub fn metadata(&self) -> Option<StrategyMetadata> {
        StrategyMetadata::from_uri(&self.metadata_uri)
    }
}

fn incomplete(address: Address, missing: MissingPart) -> RecordError {
    RecordError::IncompleteRecord { address, missing }
}

fn narrow_u32(address: Address, field: &'static str, value: U256) -> Result<u32, RecordError> {
    if value > U256::from(u32::MAX) {
        return Err(RecordError::FieldOutOfRange {
            address,
            field,
            value,
        });
    }
    Ok(value.as_limbs()[0] as u32)
}

fn narrow_u64(address: Address, field: &'static str, value: U256) -> Result<u64, RecordError> {
    if value > U256::from(u64::MAX) {
        return Err(RecordError::FieldOutOfRange {
            address,
            field,
            value,
        });
    }
    Ok(value.as_limbs()[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw_info() -> RawStrategyInfo {
        RawStrategyInfo {
            name: "Core Devs".to_string(),
            metadata_uri: String::new(),
            curator: Address::repeat_byte(0xc0),
            curator_fee_bps: U256::from(250u64),
            total_allocated: U256::MAX,
            total_donors: U256::from(12u64),
        }
    }

    fn raw_destinations() -> Vec<RawDestination> {
        vec![
            RawDestination {
                recipient: Address::repeat_byte(1),
                weight_bps: U256::from(7500u64),
                label: "Clients".to_string(),
            },
            RawDestination {
                recipient: Address::repeat_byte(2),
                weight_bps: U256::from(2500u64),
                label: String::new(),
            },
        ]
    }

    #[test]
    fn test_from_raw_keeps_full_width_total() {
        let address = Address::repeat_byte(0xab);
        let record =
            StrategyRecord::from_raw(address, Some(raw_info()), Some(raw_destinations())).unwrap();

        assert_eq!(record.address, address);
        assert_eq!(record.total_allocated, U256::MAX);
        assert_eq!(record.total_donors, 12);
        assert_eq!(record.curator_fee_bps, 250);
        assert_eq!(record.weights(), vec![7500, 2500]);
        assert_eq!(record.destinations[1].label, "");
        assert_eq!(record.fee_percent(), dec!(2.50));
    }

    #[test]
    fn test_from_raw_reports_missing_halves() {
        let address = Address::repeat_byte(0xab);

        assert_eq!(
            StrategyRecord::from_raw(address, None, Some(raw_destinations())),
            Err(RecordError::IncompleteRecord {
                address,
                missing: MissingPart::Info
            })
        );
        assert_eq!(
            StrategyRecord::from_raw(address, Some(raw_info()), None),
            Err(RecordError::IncompleteRecord {
                address,
                missing: MissingPart::Destinations
            })
        );
        assert!(matches!(
            StrategyRecord::from_raw(address, None, None),
            Err(RecordError::IncompleteRecord {
                missing: MissingPart::Both,
                ..
            })
        ));
    }

    #[test]
    fn test_from_raw_rejects_oversized_bounded_fields() {
        let address = Address::repeat_byte(0xab);
        let mut info = raw_info();
        info.total_donors = U256::from(u64::MAX) + U256::from(1u8);

        let err = StrategyRecord::from_raw(address, Some(info), Some(raw_destinations()));
        assert!(matches!(
            err,
            Err(RecordError::FieldOutOfRange {
                field: "totalDonors",
                ..
            })
        ));

        let mut destinations = raw_destinations();
        destinations[0].weight_bps = U256::from(u64::MAX);
        let err = StrategyRecord::from_raw(address, Some(raw_info()), Some(destinations));
        assert!(matches!(
            err,
            Err(RecordError::FieldOutOfRange {
                field: "weightBps",
                ..
            })
        ));
    }

    #[test]
    fn test_from_raw_does_not_revalidate_weight_total() {
        let mut destinations = raw_destinations();
        destinations[1].weight_bps = U256::from(100u64);
        let record = StrategyRecord::from_raw(
            Address::repeat_byte(0xab),
            Some(raw_info()),
            Some(destinations),
        );
        assert!(record.is_ok());
    }
}
