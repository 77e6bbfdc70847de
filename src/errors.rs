//! Error types for the collateralized lending engine

use odra::prelude::*;

/// Errors raised by the lending engine contracts
#[odra::odra_error]
pub enum LendingError {
    // Oracle errors
    /// Oracle gateway is halted
    OraclePaused = 1,
    /// Price feed returned a non-positive reading
    InvalidPrice = 2,

    // Pause / guard errors
    /// Engine is paused
    EnginePaused = 3,
    /// Reentrancy lock is held
    Locked = 4,

    // Collateral errors
    /// Not enough fungible collateral posted
    NotEnoughCollateral = 5,
    /// Caller does not hold the referenced unique item
    NotOwnerOfAsset = 6,
    /// Unknown asset class, unknown pool asset, or batch length mismatch
    InvalidAsset = 7,

    // Liquidation errors
    /// Position is healthy, cannot liquidate
    NotLiquidatable = 8,
    /// User or loan already flagged liquidated
    AlreadyLiquidated = 9,

    // Pool errors
    /// Pool balance insufficient for the requested amount
    NotEnoughLiquidity = 10,
    /// Caller is not the loan's borrower
    NotBorrower = 11,
    /// Repayment exceeds principal plus accrued interest
    OverRepayment = 12,
    /// No loan under the given identifier
    LoanNotFound = 13,

    // Access control / configuration
    /// Caller is not the admin
    Unauthorized = 14,
    /// Invalid registration parameters (bps out of range, threshold <= ltv)
    InvalidConfiguration = 15,
    /// Zero amount not allowed
    ZeroAmount = 16,
}

/// Errors raised by the local token modules
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient balance for transfer or burn
    InsufficientBalance = 1,
    /// Insufficient allowance for transfer_from
    InsufficientAllowance = 2,
    /// Caller is neither owner nor approved operator of the item
    NotApproved = 3,
    /// Item identifier already minted
    ItemExists = 4,
    /// Item identifier does not exist
    ItemNotFound = 5,
}
