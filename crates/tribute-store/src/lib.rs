//! # tribute-store
//!
//! SQLite persistence for the Tribute workspace.
//!
//! The crate plays two roles. It is the device-local key-value store that
//! holds the anonymous device identity and the like ledger, and it is a
//! self-contained stand-in for the remote backend (memorials, stories,
//! likes, comments, gallery rows and image objects) for offline use and
//! tests. Both roles are exposed through [`SqliteStore`], a shareable handle
//! over a synchronous [`Database`].

pub mod backend;
pub mod comments;
pub mod database;
pub mod kv;
pub mod likes;
pub mod media;
pub mod memorials;
pub mod migrations;
pub mod objects;
pub mod shared;
pub mod stories;

mod error;

pub use database::{default_data_dir, Database};
pub use error::StoreError;
pub use objects::LocalObjectStore;
pub use shared::SqliteStore;
