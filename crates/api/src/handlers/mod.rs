pub mod ai;
pub mod modules;
