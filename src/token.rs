//! Fungible transfer interface and a mintable CEP-18 test double
//!
//! The engine only needs debit/credit semantics from collateral and pool
//! assets; any failure inside a token call aborts the enclosing transition.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::TokenError;
use crate::events::{Approval, Transfer};

/// External CEP-18 fungible token interface
#[odra::external_contract]
pub trait Cep18Token {
    /// Get the balance of an address
    fn balance_of(&self, owner: Address) -> U256;

    /// Transfer tokens from the caller
    fn transfer(&mut self, to: Address, amount: U256) -> bool;

    /// Transfer tokens on behalf of `from` (requires allowance)
    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;

    /// Approve a spender
    fn approve(&mut self, spender: Address, amount: U256) -> bool;

    /// Get the remaining allowance
    fn allowance(&self, owner: Address, spender: Address) -> U256;
}

/// Mintable CEP-18 token used by tests and deploy scenarios
#[odra::module]
pub struct TestToken {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Total supply
    total_supply: Var<U256>,
    /// Balances: owner -> amount
    balances: Mapping<Address, U256>,
    /// Allowances: (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl TestToken {
    /// Initialize with a name and symbol
    pub fn init(&mut self, name: String, symbol: String) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.total_supply.set(U256::zero());
    }

    /// Get the token name
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Get the token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Get the total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    /// Get the balance of an address
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    /// Get the remaining allowance
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// Transfer tokens from the caller
    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.transfer_internal(caller, to, amount);
        true
    }

    /// Approve a spender
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.allowances.set(&(caller, spender), amount);
        self.env().emit_event(Approval {
            owner: caller,
            spender,
            value: amount,
        });
        true
    }

    /// Transfer tokens on behalf of `from` (requires allowance)
    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        let current_allowance = self.allowance(from, caller);
        if current_allowance < amount {
            self.env().revert(TokenError::InsufficientAllowance);
        }

        self.allowances.set(&(from, caller), current_allowance - amount);
        self.transfer_internal(from, to, amount);
        true
    }

    /// Mint new tokens
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.total_supply.set(self.total_supply() + amount);
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);

        self.env().emit_event(Transfer {
            from: self.env().self_address(),
            to,
            value: amount,
        });
    }

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }

        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);

        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }
}
