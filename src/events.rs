//! Events for the collateralized lending engine

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Collateral Events
// ============================================================================

/// Event emitted when collateral is posted
#[odra::event]
pub struct CollateralPosted {
    /// User whose position grew
    pub user: Address,
    /// Asset class identifier
    pub asset_class: u32,
    /// Quantity (fungible) or item identifier (unique)
    pub amount_or_id: U256,
    /// Timestamp of the post
    pub timestamp: u64,
}

/// Event emitted when collateral is withdrawn
#[odra::event]
pub struct CollateralWithdrawn {
    /// User whose position shrank
    pub user: Address,
    /// Asset class identifier
    pub asset_class: u32,
    /// Quantity (fungible) or item identifier (unique)
    pub amount_or_id: U256,
    /// Timestamp of the withdrawal
    pub timestamp: u64,
}

/// Event emitted when a new asset class is registered
#[odra::event]
pub struct AssetClassRegistered {
    /// Assigned class identifier
    pub asset_class: u32,
    /// Underlying token or item contract
    pub token: Address,
    /// Loan-to-value ratio in basis points
    pub ltv_bps: u32,
    /// Liquidation threshold in basis points
    pub liquidation_threshold_bps: u32,
    /// Fungible vs unique-item semantics
    pub fungible: bool,
    /// Registered by
    pub registered_by: Address,
}

/// Event emitted when a user is flagged liquidated
#[odra::event]
pub struct Liquidated {
    /// Flagged user
    pub user: Address,
    /// Timestamp of the flagging
    pub timestamp: u64,
}

// ============================================================================
// Loan Events
// ============================================================================

/// Event emitted when a loan is created
#[odra::event]
pub struct LoanCreated {
    /// Loan identifier
    pub loan_id: u64,
    /// Borrower address
    pub borrower: Address,
    /// Borrowed asset
    pub asset: Address,
    /// Principal borrowed
    pub amount: U256,
    /// Timestamp of creation
    pub timestamp: u64,
}

/// Event emitted when a loan is repaid (fully or partially)
#[odra::event]
pub struct LoanRepaid {
    /// Loan identifier
    pub loan_id: u64,
    /// Amount repaid
    pub amount: U256,
    /// Timestamp of the repayment
    pub timestamp: u64,
}

/// Event emitted when a loan is flagged liquidated
#[odra::event]
pub struct LoanLiquidated {
    /// Loan identifier
    pub loan_id: u64,
    /// Timestamp of the flagging
    pub timestamp: u64,
}

// ============================================================================
// Liquidity Events
// ============================================================================

/// Event emitted when lendable funds are added to a pool
#[odra::event]
pub struct LiquidityAdded {
    /// Address that provided the funds
    pub provider: Address,
    /// Pool asset
    pub asset: Address,
    /// Amount added
    pub amount: U256,
    /// Timestamp of the deposit
    pub timestamp: u64,
}

/// Event emitted when lendable funds are removed from a pool
#[odra::event]
pub struct LiquidityRemoved {
    /// Address that received the funds
    pub provider: Address,
    /// Pool asset
    pub asset: Address,
    /// Amount removed
    pub amount: U256,
    /// Timestamp of the withdrawal
    pub timestamp: u64,
}

/// Event emitted when a borrowable asset pool is registered
#[odra::event]
pub struct AssetPoolRegistered {
    /// Pool asset
    pub asset: Address,
    /// Initial interest rate in basis points per year
    pub rate_bps: u32,
    /// Registered by
    pub registered_by: Address,
}

/// Event emitted when a pool's interest rate changes
#[odra::event]
pub struct InterestRateUpdated {
    /// Pool asset
    pub asset: Address,
    /// New interest rate in basis points per year
    pub new_rate_bps: u32,
    /// Updated by
    pub updated_by: Address,
}

// ============================================================================
// Admin Events
// ============================================================================

/// Event emitted when the oracle gateway is halted
#[odra::event]
pub struct OraclePaused {
    /// Address that halted the gateway
    pub by: Address,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when the oracle gateway is resumed
#[odra::event]
pub struct OracleUnpaused {
    /// Address that resumed the gateway
    pub by: Address,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when a component is paused
#[odra::event]
pub struct EnginePaused {
    /// Address that paused
    pub paused_by: Address,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when a component is unpaused
#[odra::event]
pub struct EngineUnpaused {
    /// Address that unpaused
    pub unpaused_by: Address,
    /// Timestamp
    pub timestamp: u64,
}

// ============================================================================
// Token Events (local test doubles)
// ============================================================================

/// CEP-18 style transfer event
#[odra::event]
pub struct Transfer {
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Amount transferred
    pub value: U256,
}

/// CEP-18 style approval event
#[odra::event]
pub struct Approval {
    /// Token owner
    pub owner: Address,
    /// Approved spender
    pub spender: Address,
    /// Approved amount
    pub value: U256,
}

/// CEP-78 style item transfer event
#[odra::event]
pub struct ItemTransfer {
    /// Previous owner
    pub from: Address,
    /// New owner
    pub to: Address,
    /// Item identifier
    pub item_id: u64,
}
