//! Collateral Manager - posted collateral, health factors, liquidation flags
//!
//! Handles:
//! - Asset class registration (LTV, liquidation threshold, custody target)
//! - Fungible and unique-item collateral posting and withdrawal
//! - Risk-weighted health factor over the class registry
//! - One-way liquidation flagging (seizure stays with an external workflow)

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::LendingError;
use crate::events::{AssetClassRegistered, CollateralPosted, CollateralWithdrawn, EnginePaused, EngineUnpaused, Liquidated};
use crate::nft::Cep78ItemContractRef;
use crate::price_oracle::PriceOracleGatewayContractRef;
use crate::token::Cep18TokenContractRef;

/// Basis point scale (10000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Stand-in for the borrower's aggregate debt in the health factor
/// denominator.
// TODO: feed live loan principal plus accrued interest from the lending pool
// once a shared debt-registry interface exists.
pub const PLACEHOLDER_DEBT: u64 = 1;

/// Configuration of one collateral class, immutable after registration
#[odra::odra_type]
pub struct AssetClassConfig {
    /// Underlying token or item contract
    pub token: Address,
    /// Price source read through the oracle gateway
    pub price_feed: Address,
    /// Where posted collateral is escrowed
    pub custody: Address,
    /// Loan-to-value ratio in basis points (0..=10000)
    pub ltv_bps: u32,
    /// Liquidation threshold in basis points (> ltv)
    pub liquidation_threshold_bps: u32,
    /// Fungible quantity vs unique-item semantics
    pub fungible: bool,
}

/// Collateral Manager contract
#[odra::module]
pub struct CollateralManager {
    /// Registered asset classes, in registration order
    asset_classes: Mapping<u32, AssetClassConfig>,
    /// Number of registered classes
    class_count: Var<u32>,
    /// Fungible positions: (user, class) -> quantity
    fungible_positions: Mapping<(Address, u32), U256>,
    /// Unique-item positions: (user, class) -> held item ids
    item_positions: Mapping<(Address, u32), Vec<u64>>,
    /// One-way liquidation flags
    liquidated: Mapping<Address, bool>,
    /// Oracle gateway address
    oracle: Var<Address>,
    /// Admin address
    admin: Var<Address>,
    /// Paused state
    paused: Var<bool>,
    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl CollateralManager {
    /// Initialize the manager; the deployer becomes admin
    pub fn init(&mut self, oracle_gateway: Address) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.oracle.set(oracle_gateway);
        self.class_count.set(0);
        self.paused.set(false);
        self.locked.set(false);
    }

    // ========================================
    // Asset Class Registration (Admin)
    // ========================================

    /// Register a new collateral class and return its identifier
    pub fn register_asset_class(
        &mut self,
        token: Address,
        price_feed: Address,
        custody: Address,
        ltv_bps: u32,
        liquidation_threshold_bps: u32,
        fungible: bool,
    ) -> u32 {
        self.only_admin();

        if u64::from(ltv_bps) > BPS_SCALE || u64::from(liquidation_threshold_bps) > BPS_SCALE {
            self.env().revert(LendingError::InvalidConfiguration);
        }
        if liquidation_threshold_bps <= ltv_bps {
            self.env().revert(LendingError::InvalidConfiguration);
        }

        let class_id = self.class_count.get_or_default();
        let config = AssetClassConfig {
            token,
            price_feed,
            custody,
            ltv_bps,
            liquidation_threshold_bps,
            fungible,
        };
        self.asset_classes.set(&class_id, config);
        self.class_count.set(class_id + 1);

        let caller = self.env().caller();
        self.env().emit_event(AssetClassRegistered {
            asset_class: class_id,
            token,
            ltv_bps,
            liquidation_threshold_bps,
            fungible,
            registered_by: caller,
        });

        class_id
    }

    // ========================================
    // Posting / Withdrawal
    // ========================================

    /// Post collateral for the caller
    pub fn post_collateral(&mut self, asset_class: u32, amount_or_id: U256) {
        let caller = self.env().caller();
        self.post_collateral_for(caller, asset_class, amount_or_id);
    }

    /// Post collateral on behalf of `user`
    ///
    /// The lending pool uses this path when a borrow posts its referenced
    /// collateral. The custody transfer still debits `user`, so it cannot
    /// succeed without the user's prior token approval.
    pub fn post_collateral_for(&mut self, user: Address, asset_class: u32, amount_or_id: U256) {
        self.lock();
        self.ensure_not_paused();
        self.ensure_oracle_active();
        self.apply_post(user, asset_class, amount_or_id);
        self.unlock();
    }

    /// Withdraw collateral back to the caller
    pub fn withdraw_collateral(&mut self, asset_class: u32, amount_or_id: U256) {
        self.lock();
        self.ensure_not_paused();
        self.ensure_oracle_active();
        let caller = self.env().caller();
        self.apply_withdraw(caller, asset_class, amount_or_id);
        self.unlock();
    }

    /// Post a sequence of (class, amount-or-id) pairs atomically
    ///
    /// A length mismatch fails before any element is applied; any element
    /// failure reverts the whole deploy, so earlier elements never stick.
    pub fn batch_post_collateral(&mut self, asset_classes: Vec<u32>, amounts_or_ids: Vec<U256>) {
        self.lock();
        self.ensure_not_paused();
        self.ensure_oracle_active();

        if asset_classes.len() != amounts_or_ids.len() {
            self.env().revert(LendingError::InvalidAsset);
        }

        let caller = self.env().caller();
        for (class_id, amount_or_id) in asset_classes.iter().zip(amounts_or_ids.iter()) {
            self.apply_post(caller, *class_id, *amount_or_id);
        }
        self.unlock();
    }

    /// Withdraw a sequence of (class, amount-or-id) pairs atomically
    pub fn batch_withdraw_collateral(&mut self, asset_classes: Vec<u32>, amounts_or_ids: Vec<U256>) {
        self.lock();
        self.ensure_not_paused();
        self.ensure_oracle_active();

        if asset_classes.len() != amounts_or_ids.len() {
            self.env().revert(LendingError::InvalidAsset);
        }

        let caller = self.env().caller();
        for (class_id, amount_or_id) in asset_classes.iter().zip(amounts_or_ids.iter()) {
            self.apply_withdraw(caller, *class_id, *amount_or_id);
        }
        self.unlock();
    }

    // ========================================
    // Health Factor
    // ========================================

    /// Risk-weighted health factor for `user`, in basis points
    ///
    /// Sums `held x price x ltv_bps / 10000` over the class registry and
    /// divides by the placeholder debt. 10000 bps and above reads as
    /// adequately collateralized.
    pub fn calculate_health_factor(&self, user: Address) -> U256 {
        self.ensure_oracle_active();

        let oracle_address = self.oracle.get_or_revert_with(LendingError::InvalidConfiguration);
        let oracle = PriceOracleGatewayContractRef::new(self.env(), oracle_address);

        let count = self.class_count.get_or_default();
        let mut total_value = U256::zero();

        for class_id in 0..count {
            let config = self
                .asset_classes
                .get(&class_id)
                .unwrap_or_revert_with(&self.env(), LendingError::InvalidAsset);

            let held = self.held_amount(user, class_id, &config);
            if held.is_zero() {
                continue;
            }

            let price = oracle.get_price(config.price_feed);
            let contribution = held * price * U256::from(config.ltv_bps) / U256::from(BPS_SCALE);
            total_value += contribution;
        }

        total_value * U256::from(BPS_SCALE) / U256::from(PLACEHOLDER_DEBT)
    }

    // ========================================
    // Liquidation Flagging
    // ========================================

    /// Flag `user` as liquidated once any held class breaches its threshold
    ///
    /// Flag only; collateral disposition belongs to an external liquidator
    /// workflow reading `is_liquidated`.
    pub fn liquidate(&mut self, user: Address) {
        self.lock();
        self.ensure_not_paused();

        if self.liquidated.get(&user).unwrap_or_default() {
            self.env().revert(LendingError::AlreadyLiquidated);
        }

        let health_factor = self.calculate_health_factor(user);

        let count = self.class_count.get_or_default();
        for class_id in 0..count {
            let config = self
                .asset_classes
                .get(&class_id)
                .unwrap_or_revert_with(&self.env(), LendingError::InvalidAsset);

            if self.held_amount(user, class_id, &config).is_zero() {
                continue;
            }

            if health_factor < U256::from(config.liquidation_threshold_bps) {
                self.liquidated.set(&user, true);

                let timestamp = self.env().get_block_time();
                self.env().emit_event(Liquidated { user, timestamp });
                self.unlock();
                return;
            }
        }

        self.env().revert(LendingError::NotLiquidatable);
    }

    // ========================================
    // Views
    // ========================================

    /// Whether `user` has been flagged liquidated
    pub fn is_liquidated(&self, user: Address) -> bool {
        self.liquidated.get(&user).unwrap_or_default()
    }

    /// Fungible quantity posted by `user` for a class
    pub fn get_position(&self, user: Address, asset_class: u32) -> U256 {
        self.fungible_positions.get(&(user, asset_class)).unwrap_or_default()
    }

    /// Item ids posted by `user` for a unique-item class
    pub fn get_items(&self, user: Address, asset_class: u32) -> Vec<u64> {
        self.item_positions.get(&(user, asset_class)).unwrap_or_default()
    }

    /// Configuration of a registered class
    pub fn get_asset_class(&self, asset_class: u32) -> AssetClassConfig {
        self.asset_classes
            .get(&asset_class)
            .unwrap_or_revert_with(&self.env(), LendingError::InvalidAsset)
    }

    /// Number of registered classes
    pub fn class_count(&self) -> u32 {
        self.class_count.get_or_default()
    }

    /// Whether the manager is paused
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ========================================
    // Admin
    // ========================================

    /// Pause posting, withdrawal and liquidation flagging (admin only)
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

    fn apply_post(&mut self, user: Address, asset_class: u32, amount_or_id: U256) {
        let config = self
            .asset_classes
            .get(&asset_class)
            .unwrap_or_revert_with(&self.env(), LendingError::InvalidAsset);

        if config.fungible {
            if amount_or_id.is_zero() {
                self.env().revert(LendingError::ZeroAmount);
            }

            let mut token = Cep18TokenContractRef::new(self.env(), config.token);
            token.transfer_from(user, config.custody, amount_or_id);

            let balance = self.fungible_positions.get(&(user, asset_class)).unwrap_or_default();
            self.fungible_positions.set(&(user, asset_class), balance + amount_or_id);
        } else {
            let item_id = self.item_id(amount_or_id);
            let mut items = self.item_positions.get(&(user, asset_class)).unwrap_or_default();
            if items.contains(&item_id) {
                self.env().revert(LendingError::InvalidAsset);
            }

            let mut collection = Cep78ItemContractRef::new(self.env(), config.token);
            collection.transfer_from(user, config.custody, item_id);

            items.push(item_id);
            self.item_positions.set(&(user, asset_class), items);
        }

        let timestamp = self.env().get_block_time();
        self.env().emit_event(CollateralPosted {
            user,
            asset_class,
            amount_or_id,
            timestamp,
        });
    }

    fn apply_withdraw(&mut self, user: Address, asset_class: u32, amount_or_id: U256) {
        let config = self
            .asset_classes
            .get(&asset_class)
            .unwrap_or_revert_with(&self.env(), LendingError::InvalidAsset);

        if config.fungible {
            if amount_or_id.is_zero() {
                self.env().revert(LendingError::ZeroAmount);
            }

            let balance = self.fungible_positions.get(&(user, asset_class)).unwrap_or_default();
            if balance < amount_or_id {
                self.env().revert(LendingError::NotEnoughCollateral);
            }
            self.fungible_positions.set(&(user, asset_class), balance - amount_or_id);

            // An external custody target must have granted the manager an
            // allowance for releases; the manager pays out of its own
            // holdings when it is the custody itself.
            let mut token = Cep18TokenContractRef::new(self.env(), config.token);
            if config.custody == self.env().self_address() {
                token.transfer(user, amount_or_id);
            } else {
                token.transfer_from(config.custody, user, amount_or_id);
            }
        } else {
            let item_id = self.item_id(amount_or_id);
            let mut items = self.item_positions.get(&(user, asset_class)).unwrap_or_default();

            // Swap-remove keeps the operation O(1); remaining order is not
            // meaningful.
            let index = match items.iter().position(|held| *held == item_id) {
                Some(index) => index,
                None => self.env().revert(LendingError::NotOwnerOfAsset),
            };
            items.swap_remove(index);
            self.item_positions.set(&(user, asset_class), items);

            let mut collection = Cep78ItemContractRef::new(self.env(), config.token);
            collection.transfer_from(config.custody, user, item_id);
        }

        let timestamp = self.env().get_block_time();
        self.env().emit_event(CollateralWithdrawn {
            user,
            asset_class,
            amount_or_id,
            timestamp,
        });
    }

    fn held_amount(&self, user: Address, asset_class: u32, config: &AssetClassConfig) -> U256 {
        if config.fungible {
            self.fungible_positions.get(&(user, asset_class)).unwrap_or_default()
        } else {
            let items = self.item_positions.get(&(user, asset_class)).unwrap_or_default();
            U256::from(items.len() as u64)
        }
    }

    fn item_id(&self, amount_or_id: U256) -> u64 {
        if amount_or_id > U256::from(u64::MAX) {
            self.env().revert(LendingError::InvalidAsset);
        }
        amount_or_id.as_u64()
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(LendingError::EnginePaused);
        }
    }

    fn ensure_oracle_active(&self) {
        let oracle_address = self.oracle.get_or_revert_with(LendingError::InvalidConfiguration);
        let oracle = PriceOracleGatewayContractRef::new(self.env(), oracle_address);
        if oracle.is_paused() {
            self.env().revert(LendingError::OraclePaused);
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
