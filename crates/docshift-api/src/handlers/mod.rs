//! Route handlers.

pub mod convert;
pub mod diagnostics;
pub mod health;
