//! # Curator Studio
//!
//! Strategy aggregation and allocation engine for curated funding
//! strategies: named, fee-bearing policies that split incoming funds across
//! weighted destinations.
//!
//! ## Architecture
//!
//! - `allocation`: Basis-point weight math and fee/share splitting
//! - `strategy`: Strategy records built from raw ledger reads
//! - `ledger`: Ledger read trait, ABI codec, JSON-RPC client and mock
//! - `reader`: Batched, partial-failure-tolerant reads and live snapshots
//! - `views`: Rankings, totals, curator rollups and fee histograms
//! - `composer`: Strategy drafts, validation and `createStrategy` parameters
//! - `config`: Configuration management and the chain registry
//! - `utils`: Display formatting

pub mod allocation;
pub mod composer;
pub mod config;
pub mod ledger;
pub mod reader;
pub mod strategy;
pub mod utils;
pub mod views;

pub use config::Config;
