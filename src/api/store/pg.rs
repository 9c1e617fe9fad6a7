//! `PostgreSQL` backend.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{debug, info_span, instrument, Instrument};

use super::{
    NewUser, StoreError, Todo, TodoChanges, TodoStore, User, UserChanges, UserStore,
};

/// Idempotent schema, applied by the server at startup.
pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const USER_COLUMNS: &str = "id, name, email, password";
const TODO_COLUMNS: &str = "id, user_id, todos, status, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        debug!("schema applied");
        Ok(())
    }
}

fn unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Database(err),
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password")?,
    })
}

fn todo_from_row(row: &PgRow) -> Result<Todo, sqlx::Error> {
    Ok(Todo {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        todos: row.try_get("todos")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation)?;
        Ok(user_from_row(&row)?)
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    #[instrument(skip(self))]
    async fn fetch_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let query = format!(
            "UPDATE users SET name = $2, email = $3, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation)?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    #[instrument(skip(self, todos))]
    async fn create(&self, owner_id: i64, todos: String) -> Result<Todo, StoreError> {
        let query =
            format!("INSERT INTO todos (user_id, todos) VALUES ($1, $2) RETURNING {TODO_COLUMNS}");
        let row = sqlx::query(&query)
            .bind(owner_id)
            .bind(&todos)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo_from_row(&row)?)
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let query = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(todo_from_row).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError> {
        let query = format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 ORDER BY id");
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(todo_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Option<Todo>, StoreError> {
        let query = format!(
            "UPDATE todos SET todos = $2, status = $3, updated_at = NOW() WHERE id = $1 RETURNING {TODO_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&changes.todos)
            .bind(changes.status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(todo_from_row).transpose()?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
