//! Lending Pool - liquidity pools, loans, interest accrual, liquidation
//!
//! Coordinates:
//! - Per-asset liquidity pools (lendable funds, outstanding borrows, rate)
//! - Loan issuance against collateral posted through the collateral manager
//! - Simple-interest accrual and repayment
//! - The two-step liquidation handshake with the collateral manager

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::collateral_manager::{CollateralManagerContractRef, BPS_SCALE};
use crate::errors::LendingError;
use crate::events::{AssetPoolRegistered, EnginePaused, EngineUnpaused, InterestRateUpdated, LiquidityAdded, LiquidityRemoved, LoanCreated, LoanLiquidated, LoanRepaid};
use crate::token::Cep18TokenContractRef;

/// Seconds in an accrual year
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Block time is reported in milliseconds
const MILLIS_PER_SECOND: u64 = 1_000;

/// One borrowable asset's pool
#[odra::odra_type]
pub struct LiquidityPool {
    /// Lendable funds currently held
    pub total_liquidity: U256,
    /// Outstanding principal across loans
    pub total_borrows: U256,
    /// Fixed interest rate in basis points per year
    pub rate_bps: u32,
}

/// One loan; never deleted, immutable once repaid or liquidated
#[odra::odra_type]
pub struct Loan {
    /// Borrower address
    pub borrower: Address,
    /// Collateral class backing the loan
    pub collateral_class: u32,
    /// Quantity or item id posted at creation
    pub collateral_ref: U256,
    /// Borrowed asset
    pub asset: Address,
    /// Outstanding principal
    pub principal: U256,
    /// Timestamp of the last accrual base reset (ms)
    pub last_accrued: u64,
    /// One-way liquidation flag
    pub liquidated: bool,
}

/// Lending Pool contract
#[odra::module]
pub struct LendingPool {
    /// Pools per borrowable asset
    pools: Mapping<Address, LiquidityPool>,
    /// Loans by identifier
    loans: Mapping<u64, Loan>,
    /// Last issued loan identifier
    last_loan_id: Var<u64>,
    /// Collateral manager address
    collateral_manager: Var<Address>,
    /// Admin address
    admin: Var<Address>,
    /// Paused state
    paused: Var<bool>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl LendingPool {
    /// Initialize the pool; the deployer becomes admin
    pub fn init(&mut self, collateral_manager: Address) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.collateral_manager.set(collateral_manager);
        self.last_loan_id.set(0);
        self.paused.set(false);
        self.locked.set(false);
    }

    // ========================================
    // Pool Registration (Admin)
    // ========================================

    /// Register a borrowable asset with an initial interest rate
    pub fn register_asset(&mut self, asset: Address, rate_bps: u32) {
        self.only_admin();

        if self.pools.get(&asset).is_some() {
            self.env().revert(LendingError::InvalidConfiguration);
        }

        self.pools.set(
            &asset,
            LiquidityPool {
                total_liquidity: U256::zero(),
                total_borrows: U256::zero(),
                rate_bps,
            },
        );

        let caller = self.env().caller();
        self.env().emit_event(AssetPoolRegistered {
            asset,
            rate_bps,
            registered_by: caller,
        });
    }

    // ========================================
    // Liquidity
    // ========================================

    /// Add lendable funds to an asset's pool
    pub fn add_liquidity(&mut self, asset: Address, amount: U256) {
        self.lock();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let mut pool = self.pool_of(asset);

        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(caller, self.env().self_address(), amount);

        pool.total_liquidity += amount;
        self.pools.set(&asset, pool);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(LiquidityAdded {
            provider: caller,
            asset,
            amount,
            timestamp,
        });
        self.unlock();
    }

    /// Remove lendable funds from an asset's pool
    pub fn remove_liquidity(&mut self, asset: Address, amount: U256) {
        self.lock();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let mut pool = self.pool_of(asset);
        if pool.total_liquidity < amount {
            self.env().revert(LendingError::NotEnoughLiquidity);
        }

        pool.total_liquidity -= amount;
        self.pools.set(&asset, pool);

        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(caller, amount);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(LiquidityRemoved {
            provider: caller,
            asset,
            amount,
            timestamp,
        });
        self.unlock();
    }

    // ========================================
    // Borrowing
    // ========================================

    /// Borrow against freshly posted collateral
    ///
    /// Posts `collateral_ref` of `collateral_class` through the collateral
    /// manager on the caller's behalf, then requires the resulting health
    /// factor to read adequately collateralized before releasing funds.
    pub fn borrow(
        &mut self,
        collateral_class: u32,
        collateral_ref: U256,
        borrow_asset: Address,
        amount: U256,
    ) -> u64 {
        self.lock();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let mut pool = self.pool_of(borrow_asset);
        if pool.total_liquidity < amount {
            self.env().revert(LendingError::NotEnoughLiquidity);
        }

        let caller = self.env().caller();
        let manager_address = self
            .collateral_manager
            .get_or_revert_with(LendingError::InvalidConfiguration);
        let mut manager = CollateralManagerContractRef::new(self.env(), manager_address);

        manager.post_collateral_for(caller, collateral_class, collateral_ref);

        let health_factor = manager.calculate_health_factor(caller);
        if health_factor < U256::from(BPS_SCALE) {
            self.env().revert(LendingError::NotEnoughCollateral);
        }

        let loan_id = self.last_loan_id.get_or_default() + 1;
        self.last_loan_id.set(loan_id);

        let timestamp = self.env().get_block_time();
        self.loans.set(
            &loan_id,
            Loan {
                borrower: caller,
                collateral_class,
                collateral_ref,
                asset: borrow_asset,
                principal: amount,
                last_accrued: timestamp,
                liquidated: false,
            },
        );

        pool.total_liquidity -= amount;
        pool.total_borrows += amount;
        self.pools.set(&borrow_asset, pool);

        let mut token = Cep18TokenContractRef::new(self.env(), borrow_asset);
        token.transfer(caller, amount);

        self.env().emit_event(LoanCreated {
            loan_id,
            borrower: caller,
            asset: borrow_asset,
            amount,
            timestamp,
        });

        self.unlock();
        loan_id
    }

    // ========================================
    // Repayment
    // ========================================

    /// Repay a loan, fully or partially
    ///
    /// Simple interest accrues on the remaining principal since the last
    /// touch; the accrual clock resets on every repayment, so interest left
    /// unpaid by a partial repayment is not carried forward.
    pub fn repay(&mut self, loan_id: u64, amount: U256) {
        self.lock();
        self.ensure_not_paused();

        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let mut loan = self
            .loans
            .get(&loan_id)
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFound);

        let caller = self.env().caller();
        if caller != loan.borrower {
            self.env().revert(LendingError::NotBorrower);
        }
        if loan.liquidated {
            self.env().revert(LendingError::AlreadyLiquidated);
        }

        let mut pool = self.pool_of(loan.asset);
        let now = self.env().get_block_time();
        let accrued = self.simple_interest(loan.principal, pool.rate_bps, loan.last_accrued, now);

        let owed = loan.principal + accrued;
        if amount > owed {
            self.env().revert(LendingError::OverRepayment);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), loan.asset);
        token.transfer_from(caller, self.env().self_address(), amount);

        if amount == owed {
            pool.total_liquidity += amount;
            pool.total_borrows -= loan.principal;
            loan.principal = U256::zero();
        } else {
            // A partial repayment may not exceed the remaining principal;
            // anything between principal and the full owed balance must come
            // in as a full repayment.
            loan.principal = loan
                .principal
                .checked_sub(amount)
                .unwrap_or_else(|| self.env().revert(LendingError::OverRepayment));
            pool.total_liquidity += amount;
            pool.total_borrows -= amount;
        }

        loan.last_accrued = now;
        let asset = loan.asset;
        self.loans.set(&loan_id, loan);
        self.pools.set(&asset, pool);

        self.env().emit_event(LoanRepaid {
            loan_id,
            amount,
            timestamp: now,
        });
        self.unlock();
    }

    // ========================================
    // Liquidation
    // ========================================

    /// Flag a loan liquidated once the collateral manager has flagged its
    /// borrower
    ///
    /// Flag only; funds and collateral disposition belong to the external
    /// liquidator workflow.
    pub fn liquidate(&mut self, loan_id: u64) {
        self.lock();
        let mut loan = self
            .loans
            .get(&loan_id)
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFound);

        if loan.liquidated {
            self.env().revert(LendingError::AlreadyLiquidated);
        }

        let manager_address = self
            .collateral_manager
            .get_or_revert_with(LendingError::InvalidConfiguration);
        let manager = CollateralManagerContractRef::new(self.env(), manager_address);
        if !manager.is_liquidated(loan.borrower) {
            self.env().revert(LendingError::NotLiquidatable);
        }

        loan.liquidated = true;
        self.loans.set(&loan_id, loan);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(LoanLiquidated { loan_id, timestamp });
        self.unlock();
    }

    // ========================================
    // Views
    // ========================================

    /// Loan under the given identifier
    pub fn get_loan(&self, loan_id: u64) -> Option<Loan> {
        self.loans.get(&loan_id)
    }

    /// Pool of a registered asset
    pub fn get_pool(&self, asset: Address) -> LiquidityPool {
        self.pool_of(asset)
    }

    /// Interest accrued on a loan since its last touch, at the pool's
    /// current rate
    pub fn accrued_interest(&self, loan_id: u64) -> U256 {
        let loan = self
            .loans
            .get(&loan_id)
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFound);
        let pool = self.pool_of(loan.asset);
        let now = self.env().get_block_time();
        self.simple_interest(loan.principal, pool.rate_bps, loan.last_accrued, now)
    }

    /// Identifier of the most recently created loan
    pub fn last_loan_id(&self) -> u64 {
        self.last_loan_id.get_or_default()
    }

    /// Whether the pool is paused
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ========================================
    // Admin
    // ========================================

    /// Change an asset's interest rate; applies at the next accrual
    /// evaluation of every loan of that asset
    pub fn set_interest_rate(&mut self, asset: Address, new_rate_bps: u32) {
        self.only_admin();

        let mut pool = self.pool_of(asset);
        pool.rate_bps = new_rate_bps;
        self.pools.set(&asset, pool);

        let caller = self.env().caller();
        self.env().emit_event(InterestRateUpdated {
            asset,
            new_rate_bps,
            updated_by: caller,
        });
    }

    /// Pause liquidity and loan mutations (admin only)
    pub fn pause(&mut self) {
        self.only_admin();
        self.paused.set(true);

        let caller = self.env().caller();
        let timestamp = self.env().get_block_time();
        self.env().emit_event(EnginePaused {
            paused_by: caller,
            timestamp,
        });
    }

    /// Resume operations (admin only)
    pub fn unpause(&mut self) {
        self.only_admin();
        self.paused.set(false);

        let caller = self.env().caller();
        let timestamp = self.env().get_block_time();
        self.env().emit_event(EngineUnpaused {
            unpaused_by: caller,
            timestamp,
        });
    }

    // ========================================
    // Internals
    // ========================================

    fn pool_of(&self, asset: Address) -> LiquidityPool {
        self.pools
            .get(&asset)
            .unwrap_or_revert_with(&self.env(), LendingError::InvalidAsset)
    }

    fn simple_interest(&self, principal: U256, rate_bps: u32, last_accrued: u64, now: u64) -> U256 {
        let elapsed_seconds = now.saturating_sub(last_accrued) / MILLIS_PER_SECOND;
        principal * U256::from(rate_bps) * U256::from(elapsed_seconds)
            / (U256::from(BPS_SCALE) * U256::from(SECONDS_PER_YEAR))
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(LendingError::EnginePaused);
        }
    }

    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(LendingError::Locked);
        }
        self.locked.set(true);
    }

    fn unlock(&mut self) {
        self.locked.set(false);
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}
