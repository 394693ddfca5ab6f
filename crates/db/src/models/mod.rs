//! Row models and DTOs.

pub mod module_data;
