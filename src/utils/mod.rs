//! Shared display helpers.

mod display;

pub use display::{format_address, format_ether, format_units, truncate_name, ETHER_DECIMALS};
