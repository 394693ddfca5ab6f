//! StudioOS domain layer.
//!
//! Entities for every dashboard page, the generic collection operations
//! they share, storage key naming, and the derived metrics shown on each
//! page. This crate performs no I/O; persistence lives in `studioos-store`
//! (local) and `studioos-db` (remote module rows).

pub mod activity;
pub mod asset;
pub mod brand;
pub mod content;
pub mod entity;
pub mod error;
pub mod experiment;
pub mod ids;
pub mod metrics;
pub mod note;
pub mod settings;
pub mod storage_keys;
pub mod types;
pub mod validation;
