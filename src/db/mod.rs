// Declare database submodules
pub mod error;
pub mod models;
pub mod postgres; // Contains schema.rs and pool setup
pub mod repositories;
