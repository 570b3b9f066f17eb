//! Math Pinball (workspace facade crate).
//!
//! This package keeps the `math_pinball::{core,adapter,term,input,types}` public
//! API stable while the implementation lives in dedicated crates under `crates/`.

pub use math_pinball_adapter as adapter;
pub use math_pinball_core as core;
pub use math_pinball_input as input;
pub use math_pinball_term as term;
pub use math_pinball_types as types;
