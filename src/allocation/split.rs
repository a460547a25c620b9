//! Fee and share splitting of a funded amount.
//!
//! Mirrors the ledger's distribution formula: the curator fee and every
//! destination share are floor(amount * bps / 10000) of the *gross* amount.
//! Shares are not taken from the post-fee distributable amount, so fee plus
//! shares can exceed the amount whenever the fee is non-zero.

use alloy_primitives::U256;

use super::math::BPS_DENOMINATOR;

/// Result of splitting one amount across a curator fee and destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationSplit {
    /// Amount being split
    pub amount: U256,
    /// Curator's cut: floor(amount * fee / 10000)
    pub curator_fee: U256,
    /// amount - curator_fee
    pub distributable: U256,
    /// Gross share per destination, in input order
    pub per_destination: Vec<U256>,
}

/// What is left over (or overdrawn) after fee and shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residual {
    /// Floor-division dust that stays undistributed. Accepted, never redistributed.
    Dust(U256),
    /// Fee plus gross shares exceed the amount by this much.
    Excess(U256),
}

impl AllocationSplit {
    /// Sum of all destination shares.
    pub fn shares_total(&self) -> U256 {
        self.per_destination
            .iter()
            .fold(U256::ZERO, |acc, share| acc.saturating_add(*share))
    }

    /// Compare fee plus shares against the amount.
    pub fn residual(&self) -> Residual {
        let paid_out = self.curator_fee.saturating_add(self.shares_total());
        if paid_out <= self.amount {
            Residual::Dust(self.amount - paid_out)
        } else {
            Residual::Excess(paid_out - self.amount)
        }
    }
}

/// floor(amount * bps / 10000) without intermediate overflow.
///
/// Splits `amount = q * 10000 + r` so only `q * bps` and `r * bps` are ever
/// multiplied; both stay below `amount` for `bps <= 10000`.
pub fn mul_bps(amount: U256, bps: u32) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    let bps = U256::from(bps);
    let quotient = amount / denominator;
    let remainder = amount % denominator;
    quotient.saturating_mul(bps) + (remainder * bps) / denominator
}

/// Split `amount` into the curator fee and one gross share per weight.
pub fn split_amount(amount: U256, curator_fee_bps: u32, weights: &[u32]) -> AllocationSplit {
    let curator_fee = mul_bps(amount, curator_fee_bps);
    let per_destination = weights.iter().map(|&w| mul_bps(amount, w)).collect();

    AllocationSplit {
        amount,
        curator_fee,
        distributable: amount.saturating_sub(curator_fee),
        per_destination,
    }
}
