//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod module_data_repo;

pub use module_data_repo::ModuleDataRepo;
