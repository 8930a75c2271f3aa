// Thin re-export module: implementation is split across `ledger/chain.rs`
// (block structure, hashing, append) and `ledger/verify.rs` (integrity
// verification) to keep chain management and validation separable.

pub mod chain;
pub mod verify;

pub use chain::*;
pub use verify::*;
