//! In-memory store with the same semantics as the Postgres backend.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{
    NewUser, StoreError, Todo, TodoChanges, TodoStore, User, UserChanges, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    todos: BTreeMap<i64, Todo>,
    next_user_id: i64,
    next_todo_id: i64,
}

/// Implements both [`UserStore`] and [`TodoStore`]; ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user outright. The service never deletes accounts; this lets
    /// tests model an account that disappeared behind a still-valid token.
    pub async fn remove_user(&self, id: i64) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }

    /// Number of stored todos across all owners.
    pub async fn todo_count(&self) -> usize {
        self.tables.read().await.todos.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        tables.next_user_id += 1;
        let record = User {
            id: tables.next_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != id && u.email == changes.email)
        {
            return Err(StoreError::Conflict);
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.name = changes.name;
        user.email = changes.email;
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, owner_id: i64, todos: String) -> Result<Todo, StoreError> {
        let mut tables = self.tables.write().await;
        tables.next_todo_id += 1;
        let now = Utc::now();
        let record = Todo {
            id: tables.next_todo_id,
            user_id: owner_id,
            todos,
            status: false,
            created_at: now,
            updated_at: now,
        };
        tables.todos.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(self.tables.read().await.todos.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .todos
            .values()
            .filter(|t| t.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> Result<Option<Todo>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(todo) = tables.todos.get_mut(&id) else {
            return Ok(None);
        };
        todo.todos = changes.todos;
        todo.status = changes.status;
        todo.updated_at = Utc::now();
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.todos.remove(&id).is_some())
    }
}
