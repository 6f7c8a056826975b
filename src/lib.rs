// Declare the main modules
pub mod config;
pub mod db;

pub use db::error::{ConstraintKind, DbError, DbResult};
pub use db::repositories::Repositories;
