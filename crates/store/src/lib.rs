//! Local-first persistence for StudioOS.
//!
//! Every page value lives in memory and is mirrored to a [`backend::KvBackend`]
//! through a [`binding::StoreBinding`]. The dashboard settings blob is
//! additionally pushed to the server through [`sync::DebouncedSync`].

pub mod backend;
pub mod binding;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod sync;
pub mod workspace;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use binding::{StorageWarning, StoreBinding};
pub use collection::CollectionStore;
pub use config::StoreConfig;
pub use error::StoreError;
pub use http::HttpModuleSink;
pub use sync::{DebouncedSync, ModuleSink};
pub use workspace::Workspace;
