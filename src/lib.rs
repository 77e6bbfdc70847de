#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Engine modules
pub mod collateral_manager;
pub mod lending_pool;
pub mod price_oracle;

// Shared types
pub mod errors;
pub mod events;

// Asset interfaces and test doubles
pub mod nft;
pub mod token;
