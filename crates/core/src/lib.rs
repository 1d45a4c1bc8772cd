//! Backend-free building blocks for the monotable project.
//!
//! Everything in this crate is pure and synchronous: K-sortable
//! identifiers used as sort keys, and the key-schema value types shared
//! with the DynamoDB-facing `monotable` crate.

pub mod error;
pub mod key;
pub mod ksuid;

pub use error::KsuidError;
pub use key::{ItemKey, KeySpec};
pub use ksuid::{Ksuid, KsuidMs};
