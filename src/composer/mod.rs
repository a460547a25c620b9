//! Strategy authoring.
//!
//! A [`StrategyDraft`] is edited freely; validity is a separate query
//! ([`StrategyDraft::validate`]) and only gates the conversion into
//! `createStrategy` call parameters.

mod draft;
mod validation;

pub use draft::{DestinationField, DraftDestination, StrategyDraft, DEFAULT_CURATOR_FEE_BPS};
pub use validation::{is_submittable, is_valid_recipient, parse_recipient, DraftError, DraftReport};
