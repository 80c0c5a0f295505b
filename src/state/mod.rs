//! State Module - persistent values that survive view reconstruction
//!
//! - **Store** - cells keyed by (structural identity, declaration slot), with
//!   per-pass liveness tracking and garbage collection
//! - **Cell** - the [`State`] handle views hold; writes request a rerender

mod cell;
mod store;

pub use cell::*;
pub use store::*;
