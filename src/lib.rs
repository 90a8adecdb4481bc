#![deny(clippy::pedantic)]
#![deny(warnings)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

//! Reversible, authenticated masking of internal identifiers into opaque,
//! URL-safe tokens. See the crate-level README for an overview and an
//! end-to-end example; see each module below for the detail this crate is
//! actually built from.
//!
//! # Layout
//!
//! - [`secret_key`] / [`key_store`]: validated key material and the
//!   catalog of keys an engine is bound to.
//! - [`entropy`]: the `EntropySource` trait engines draw randomness from,
//!   injected rather than hard-coded, so callers can substitute a fixed
//!   source in tests.
//! - [`mask`]: the `Mask` trait both engines implement.
//! - [`engine8`] / [`engine16`]: the two concrete masking engines, for
//!   identifiers up to 8 and 16 bytes respectively.
//! - [`ids`]: typed convenience wrappers (integer, UUID, raw bytes) over
//!   the byte-level `Mask` API.
//! - [`error`]: the single error type surfaced by every fallible
//!   operation.

mod b64;
mod byte_fns;
mod helpers;
mod version;

pub mod engine16;
pub mod engine8;
pub mod entropy;
pub mod error;
pub mod ids;
pub mod key_store;
pub mod mask;
pub mod secret_key;
