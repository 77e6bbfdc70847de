//! Unique-item transfer interface and a mintable CEP-78 style test double
//!
//! Mirrored items from other networks arrive through an external bridge and
//! present the same interface, so the engine never distinguishes native from
//! synthetic items.

use odra::prelude::*;
use crate::errors::TokenError;
use crate::events::ItemTransfer;

/// External unique-item (CEP-78 style) interface
#[odra::external_contract]
pub trait Cep78Item {
    /// Current owner of an item
    fn owner_of(&self, item_id: u64) -> Address;

    /// Move an item between owners (requires ownership or operator approval)
    fn transfer_from(&mut self, from: Address, to: Address, item_id: u64);

    /// Grant or revoke operator rights over all of the caller's items
    fn set_approval_for_all(&mut self, operator: Address, approved: bool);
}

/// Mintable unique-item collection used by tests and deploy scenarios
#[odra::module]
pub struct TestItemCollection {
    /// Collection name
    name: Var<String>,
    /// Item owners: item id -> owner
    owners: Mapping<u64, Address>,
    /// Operator approvals: (owner, operator) -> approved
    operators: Mapping<(Address, Address), bool>,
}

#[odra::module]
impl TestItemCollection {
    /// Initialize with a collection name
    pub fn init(&mut self, name: String) {
        self.name.set(name);
    }

    /// Get the collection name
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Current owner of an item
    pub fn owner_of(&self, item_id: u64) -> Address {
        self.owners
            .get(&item_id)
            .unwrap_or_revert_with(&self.env(), TokenError::ItemNotFound)
    }

    /// Whether `operator` may move `owner`'s items
    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operators.get(&(owner, operator)).unwrap_or_default()
    }

    /// Grant or revoke operator rights over all of the caller's items
    pub fn set_approval_for_all(&mut self, operator: Address, approved: bool) {
        let caller = self.env().caller();
        self.operators.set(&(caller, operator), approved);
    }

    /// Move an item between owners
    pub fn transfer_from(&mut self, from: Address, to: Address, item_id: u64) {
        let caller = self.env().caller();
        let owner = self.owner_of(item_id);

        if owner != from {
            self.env().revert(TokenError::NotApproved);
        }
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            self.env().revert(TokenError::NotApproved);
        }

        self.owners.set(&item_id, to);
        self.env().emit_event(ItemTransfer { from, to, item_id });
    }

    /// Mint a new item to `to`
    pub fn mint(&mut self, to: Address, item_id: u64) {
        if self.owners.get(&item_id).is_some() {
            self.env().revert(TokenError::ItemExists);
        }
        self.owners.set(&item_id, to);

        self.env().emit_event(ItemTransfer {
            from: self.env().self_address(),
            to,
            item_id,
        });
    }
}
