use std::sync::Arc;
use diesel::pg::{Pg, PgConnection};
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Double, Integer, Text};

use tracing::error;

use super::DBPool; // Use DBPool from parent mod
use crate::db::error::{DbError, DbResult};

/// Runs a synchronous Diesel operation on a pooled connection.
///
/// Wraps the checkout and the query in `spawn_blocking` so async callers are
/// never blocked; a panic inside `op` surfaces as `DbError::Task`.
pub async fn run_blocking<T, F>(pool: Arc<DBPool>, op: F) -> DbResult<T>
where
    F: FnOnce(&mut PgConnection) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            error!(error = %e, "Failed to get DB connection");
            DbError::from(e)
        })?;
        op(&mut *conn)
    })
    .await;

    // Handle potential JoinError from spawn_blocking and flatten the Result
    result.map_err(|join_err| {
        error!(error = %join_err, "Database task failed");
        DbError::from(join_err)
    })?
}

/// A value bound to one placeholder of a [`ParamQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i32),
    BigInt(i64),
    Double(f64),
}

/// Raw SQL assembled piece by piece, where every placeholder is written
/// together with the value it binds.
///
/// `param` numbers the placeholder from the binds pushed so far, so clauses
/// can be added, skipped or reordered without renumbering anything.
pub struct ParamQuery {
    query: BoxedSqlQuery<'static, Pg, SqlQuery>,
    params: usize,
}

impl ParamQuery {
    pub fn new(sql: &str) -> Self {
        ParamQuery {
            query: diesel::sql_query(sql).into_boxed(),
            params: 0,
        }
    }

    /// Appends SQL that carries no parameter.
    pub fn sql(mut self, sql: &str) -> Self {
        self.query = self.query.sql(sql);
        self
    }

    /// Appends `{prefix} $n` and binds `value` to `$n`.
    pub fn param(mut self, prefix: &str, value: BindValue) -> Self {
        self.params += 1;
        let query = self.query.sql(format!("{} ${}\n", prefix, self.params));
        self.query = match value {
            BindValue::Text(v) => query.bind::<Text, _>(v),
            BindValue::Integer(v) => query.bind::<Integer, _>(v),
            BindValue::BigInt(v) => query.bind::<BigInt, _>(v),
            BindValue::Double(v) => query.bind::<Double, _>(v),
        };
        self
    }

    #[cfg(test)]
    pub fn param_count(&self) -> usize {
        self.params
    }

    pub fn into_query(self) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use diesel::r2d2::ConnectionManager;
    use std::time::Duration;

    #[test]
    fn placeholders_follow_bind_order() {
        let query = ParamQuery::new("SELECT * FROM users WHERE 1 = 1\n")
            .param("AND name =", BindValue::Text("Ada".to_string()))
            .sql("-- no parameter here\n")
            .param("AND id =", BindValue::Integer(7))
            .param("LIMIT", BindValue::BigInt(3));

        assert_eq!(query.param_count(), 3);

        let rendered = debug_query::<Pg, _>(&query.into_query()).to_string();
        assert!(rendered.starts_with(
            "SELECT * FROM users WHERE 1 = 1\nAND name = $1\n-- no parameter here\nAND id = $2\nLIMIT $3\n"
        ));
        assert!(rendered.contains("\"Ada\""));
    }

    #[tokio::test]
    async fn unreachable_database_is_reported_as_unavailable() {
        let manager = ConnectionManager::<PgConnection>::new(
            "host=127.0.0.1 port=1 dbname=lightbnb user=nobody connect_timeout=1",
        );
        let pool = Arc::new(
            DBPool::builder()
                .max_size(1)
                .connection_timeout(Duration::from_millis(200))
                .build_unchecked(manager),
        );

        let err = run_blocking(pool, |_conn| Ok(())).await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)), "got {:?}", err);
    }

    #[test]
    fn query_without_params_is_left_untouched() {
        let query = ParamQuery::new("SELECT 1");
        assert_eq!(query.param_count(), 0);
        let rendered = debug_query::<Pg, _>(&query.into_query()).to_string();
        assert!(rendered.starts_with("SELECT 1"));
    }
}
