use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use std::sync::Arc;

// Define the common DBPool type alias, making it available to submodules
pub type DBPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Row cap used when a list query is called without an explicit limit.
pub const DEFAULT_LIMIT: i64 = 10;

// Declare the repository implementation modules
pub mod properties;
pub mod reservations;
pub mod users;
// Declare the utility module
pub mod repositories_utils;

use properties::PropertyRepository;
use reservations::ReservationRepository;
use users::UserRepository;

/// Every repository, sharing one connection pool.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub reservations: ReservationRepository,
    pub properties: PropertyRepository,
}

impl Repositories {
    pub fn new(pool: Arc<DBPool>) -> Self {
        Repositories {
            users: UserRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            properties: PropertyRepository::new(pool),
        }
    }
}
