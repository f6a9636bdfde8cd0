//! Survey table schema
//!
//! This module defines the untyped input shape (headers plus raw rows) and the
//! fixed table of known survey columns that the normalizer maps them onto.

mod columns;
mod raw_row;

pub use columns::*;
pub use raw_row::*;
