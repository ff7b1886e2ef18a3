//! # 64K BASIC variable memory
//!
//! Array variable storage for a BASIC of the 8-bit era, faithful to
//! the original in-memory layout. Arrays are packed records in one
//! growing byte area; `VARPTR` returns real addresses into it, `PEEK`
//! reads any byte of it back, and `ERASE` compacts it exactly as the
//! original machines did.
//!
//! The interpreter owns a session [`mach::Arrays`] table plus the
//! shared [`mach::Memory`] budget, and drives everything through them:
//!
//! ```
//! use basic_mem::lang::Ident;
//! use basic_mem::mach::{Arrays, Val};
//!
//! let mut arrays = Arrays::default();
//! let a = Ident::new("A").unwrap();
//! arrays.dimension(&a, &[3, 4]).unwrap();
//! arrays.store(&a, &[3, 4], Val::Single(1.0)).unwrap();
//! let address = arrays.varptr(&a, &[3, 4]).unwrap();
//! assert_eq!(arrays.peek(address), Some(0));
//! ```

pub mod lang;
pub mod mach;
