//! Price Oracle Gateway - reads external price feeds for collateral valuation
//!
//! The gateway owns a single circuit-breaker flag. While it is set, every
//! price-dependent operation in the engine (post, withdraw, health factor,
//! borrow, liquidate) reverts with `OraclePaused`. Readings are never cached.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::LendingError;
use crate::events::{OraclePaused, OracleUnpaused};

/// External price feed interface (Chainlink-style signed reading)
#[odra::external_contract]
pub trait PriceFeed {
    /// Latest reported price; non-positive readings are invalid
    fn latest_answer(&self) -> i64;
}

/// Price Oracle Gateway contract
#[odra::module]
pub struct PriceOracleGateway {
    /// Circuit-breaker flag
    paused: Var<bool>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl PriceOracleGateway {
    /// Initialize the gateway; the deployer becomes admin
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.paused.set(false);
    }

    /// Fetch a fresh price from the given feed
    ///
    /// Reverts with `OraclePaused` while the circuit breaker is set and with
    /// `InvalidPrice` when the feed reports a non-positive value.
    pub fn get_price(&self, feed: Address) -> U256 {
        if self.paused.get_or_default() {
            self.env().revert(LendingError::OraclePaused);
        }

        let feed_ref = PriceFeedContractRef::new(self.env(), feed);
        let answer = feed_ref.latest_answer();
        if answer <= 0 {
            self.env().revert(LendingError::InvalidPrice);
        }

        U256::from(answer as u64)
    }

    /// Whether the circuit breaker is set
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    /// Halt all price reads (admin only)
    pub fn pause_oracle(&mut self) {
        self.only_admin();
        self.paused.set(true);

        let caller = self.env().caller();
        let timestamp = self.env().get_block_time();
        self.env().emit_event(OraclePaused {
            by: caller,
            timestamp,
        });
    }

    /// Resume price reads (admin only)
    pub fn unpause_oracle(&mut self) {
        self.only_admin();
        self.paused.set(false);

        let caller = self.env().caller();
        let timestamp = self.env().get_block_time();
        self.env().emit_event(OracleUnpaused {
            by: caller,
            timestamp,
        });
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}

/// Minimal admin-settable feed, used by tests and deploy scripts
#[odra::module]
pub struct StaticPriceFeed {
    /// Latest reading
    answer: Var<i64>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl StaticPriceFeed {
    /// Initialize with a first reading; the deployer becomes admin
    pub fn init(&mut self, initial_answer: i64) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.answer.set(initial_answer);
    }

    /// Latest reported price
    pub fn latest_answer(&self) -> i64 {
        self.answer.get_or_default()
    }

    /// Update the reading (admin only)
    pub fn set_answer(&mut self, answer: i64) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
        self.answer.set(answer);
    }
}
