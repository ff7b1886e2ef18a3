/*!
# Rust Language Module

This Rust module provides the language-level types shared across the
machine: platform error codes and variable identifiers.

*/

#[macro_use]
mod error;
mod ident;


pub use error::Error;
pub use error::ErrorCode;
pub use ident::Ident;
