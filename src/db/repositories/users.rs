use crate::db::error::{DbError, DbResult};
use crate::db::models::user::{NewUser, User};
use crate::db::postgres::schema::users::dsl::*;
use crate::db::repositories::repositories_utils::run_blocking;
use crate::db::repositories::DBPool;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct UserRepository {
    pool: Arc<DBPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        UserRepository { pool }
    }

    /// Looks a user up by exact email. `Ok(None)` when nobody matches.
    pub async fn get_user_with_email(&self, target_email: &str) -> DbResult<Option<User>> {
        let target_email = target_email.to_string();
        debug!(email = %target_email, "Fetching user by email");
        run_blocking(self.pool.clone(), move |conn| {
            match users
                .filter(email.eq(&target_email))
                .select(User::as_select())
                .first::<User>(conn)
            {
                Ok(user) => Ok(Some(user)),
                Err(DieselError::NotFound) => Ok(None),
                Err(e) => {
                    error!(email = %target_email, error = ?e, "Failed to find User by email");
                    Err(DbError::from(e))
                }
            }
        })
        .await
    }

    pub async fn get_user_with_id(&self, user_id: i32) -> DbResult<Option<User>> {
        debug!(user_id, "Fetching user by id");
        run_blocking(self.pool.clone(), move |conn| {
            match users
                .find(user_id)
                .select(User::as_select())
                .first::<User>(conn)
            {
                Ok(user) => Ok(Some(user)),
                Err(DieselError::NotFound) => Ok(None),
                Err(e) => {
                    error!(user_id, error = ?e, "Failed to find User by id");
                    Err(DbError::from(e))
                }
            }
        })
        .await
    }

    /// Inserts a user and returns the stored row.
    pub async fn add_user(&self, new_user: NewUser) -> DbResult<User> {
        run_blocking(self.pool.clone(), move |conn| {
            diesel::insert_into(users)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(conn)
                .map_err(|e| {
                    // Never log the password.
                    error!(user_name = %new_user.name, email = %new_user.email, error = ?e, "Failed to insert User");
                    DbError::from(e)
                })
        })
        .await
    }
}
