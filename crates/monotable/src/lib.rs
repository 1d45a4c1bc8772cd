//! Single-table DynamoDB conveniences for short-lived serverless handlers.
//!
//! This crate standardizes how application types map to stored items
//! (simple or composite `PK`/`SK` keys), validates declared-required
//! fields before writes, and keeps one lazily initialized client per
//! process. Durability, query semantics, and retry policy stay with
//! DynamoDB and the caller; nothing here retries, caches, or coordinates.
//!
//! ```no_run
//! use monotable::{attrs, Item, ItemKey, Ksuid, MappingError, Model, Store};
//!
//! struct Note {
//!     tenant: String,
//!     id: Ksuid,
//!     body: String,
//! }
//!
//! impl Model for Note {
//!     const ENTITY_TYPE: &'static str = "NOTE";
//!
//!     fn key(&self) -> ItemKey {
//!         ItemKey::composite(format!("TENANT#{}", self.tenant), format!("NOTE#{}", self.id))
//!     }
//!
//!     fn attributes(&self) -> Item {
//!         let mut item = Item::new();
//!         item.insert("tenant".to_string(), attrs::s(&self.tenant));
//!         item.insert("id".to_string(), attrs::s(self.id.to_string()));
//!         item.insert("body".to_string(), attrs::s(&self.body));
//!         item
//!     }
//!
//!     fn from_attributes(item: &Item) -> Result<Self, MappingError> {
//!         Ok(Self {
//!             tenant: attrs::get_string(item, "tenant")?,
//!             id: attrs::get_ksuid(item, "id")?,
//!             body: attrs::get_string(item, "body")?,
//!         })
//!     }
//! }
//!
//! # async fn demo() -> Result<(), monotable::StoreError> {
//! let store = Store::from_env().await;
//! let note = Note {
//!     tenant: "acme".to_string(),
//!     id: Ksuid::new(),
//!     body: "hello".to_string(),
//! };
//! store.put_if_not_exists(&note).await?;
//! # Ok(())
//! # }
//! ```

pub mod attrs;
pub mod client;
pub mod error;
pub mod model;
pub mod store;

pub use attrs::Item;
pub use client::{create_client, shared_client, table_name_from_env, ClientConfig};
pub use error::{EmptyValueError, MappingError, Result, StoreError};
pub use model::{Expires, Model, SortedById, ValidatesPresence};
pub use store::{BatchGet, Store};

pub use monotable_core::{ItemKey, KeySpec, Ksuid, KsuidError, KsuidMs};
