use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TodoStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Todo, TodoUpdate, User, UserChanges};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    todos: HashMap<Uuid, Todo>,
}

impl Collections {
    fn check_unique(&self, id: Option<Uuid>, username: &str, email: &str) -> Result<(), AppError> {
        for user in self.users.values().filter(|u| Some(u.id) != id) {
            if user.email == email {
                return Err(AppError::BadRequest("Email already registered".into()));
            }
            if user.username == username {
                return Err(AppError::BadRequest("Username already taken".into()));
            }
        }
        Ok(())
    }
}

/// In-process store with the same uniqueness, ownership and cascade rules as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        inner.check_unique(None, &new_user.username, &new_user.email)?;

        let user = User::new(new_user);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(current) = inner.users.get(&id) else {
            return Ok(None);
        };

        let username = changes.username.unwrap_or_else(|| current.username.clone());
        let email = changes.email.unwrap_or_else(|| current.email.clone());
        inner.check_unique(Some(id), &username, &email)?;

        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.username = username;
        user.email = email;
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        let before = inner.todos.len();
        inner.todos.retain(|_, todo| todo.user_id != id);
        debug!("removed {} todos owned by {}", before - inner.todos.len(), id);
        Ok(true)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create_todo(&self, todo: Todo) -> Result<Todo, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&todo.user_id) {
            return Err(AppError::BadRequest("Referenced user does not exist".into()));
        }
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self, owner: Uuid) -> Result<Vec<Todo>, AppError> {
        let inner = self.inner.read().await;
        let mut todos: Vec<Todo> = inner
            .todos
            .values()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        todos.sort_by_key(|t| t.created_at);
        Ok(todos)
    }

    async fn find_todo(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .todos
            .get(&id)
            .filter(|t| t.user_id == owner)
            .cloned())
    }

    async fn update_todo(
        &self,
        id: Uuid,
        owner: Uuid,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, AppError> {
        let mut inner = self.inner.write().await;
        match inner.todos.get_mut(&id).filter(|t| t.user_id == owner) {
            Some(todo) => {
                todo.apply(update);
                Ok(Some(todo.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_todo(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let owned = inner.todos.get(&id).is_some_and(|t| t.user_id == owner);
        if owned {
            inner.todos.remove(&id);
        }
        Ok(owned)
    }
}
