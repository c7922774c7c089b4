//! Persistence for users and todos.
//!
//! Handlers only see the `UserStore` and `TodoStore` traits. `PgStore` is the
//! production implementation; `MemoryStore` keeps everything in process and is
//! used by the test suite.
//!
//! Every todo operation addressed by id takes the caller's user id and only
//! matches records owned by that user, so a todo owned by someone else behaves
//! exactly like a missing one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Todo, TodoUpdate, User, UserChanges};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AppError::BadRequest` if the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Returns `None` if no user has this id.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;

    /// Deletes the user and every todo they own. Returns whether the user existed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create_todo(&self, todo: Todo) -> Result<Todo, AppError>;

    /// All todos owned by `owner`, oldest first.
    async fn list_todos(&self, owner: Uuid) -> Result<Vec<Todo>, AppError>;

    async fn find_todo(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError>;

    async fn update_todo(
        &self,
        id: Uuid,
        owner: Uuid,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, AppError>;

    async fn delete_todo(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError>;
}
