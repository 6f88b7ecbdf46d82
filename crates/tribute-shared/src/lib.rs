//! # tribute-shared
//!
//! Types shared by every crate of the workspace: canonical identifiers, the
//! backend row models, the backend and key-value seams, and the presentation
//! helpers used by the memorial pages.

pub mod auth;
pub mod backend;
pub mod constants;
pub mod error;
pub mod format;
pub mod kv;
pub mod models;
pub mod types;
pub mod video;

pub use backend::{EngagementBackend, MemorialBackend, ObjectStorage};
pub use error::{BackendError, KvError};
pub use kv::{KeyValueStore, MemoryStore};
pub use types::{DeviceId, StoryId};
