//! # HTTP Handlers
//!
//! Handlers only parse input, call [`sedekat_ledger::LedgerService`] and
//! shape the response. Amounts are integers: commission in sen, points as
//! whole points.

pub mod balances;
pub mod health;
pub mod orders;
pub mod redemptions;
pub mod rewards;

#[cfg(test)]
pub(crate) mod test_support;
