use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{TodoStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Todo, TodoUpdate, User, UserChanges};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str =
    "id, title, description, start_date, end_date, completed, user_id, created_at, updated_at";

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("Connected to database");

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = User::new(new_user);
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users
             SET username = COALESCE($2, username),
                 email = COALESCE($3, email),
                 password_hash = COALESCE($4, password_hash),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create_todo(&self, todo: Todo) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos (id, title, description, start_date, end_date, completed, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {TODO_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.start_date)
            .bind(todo.end_date)
            .bind(todo.completed)
            .bind(todo.user_id)
            .bind(todo.created_at)
            .bind(todo.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_todos(&self, owner: Uuid) -> Result<Vec<Todo>, AppError> {
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 ORDER BY created_at");
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn find_todo(&self, id: Uuid, owner: Uuid) -> Result<Option<Todo>, AppError> {
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2");
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        owner: Uuid,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, AppError> {
        let update = update.normalized();
        // An empty description clears it.
        let sql = format!(
            "UPDATE todos
             SET title = COALESCE($3, title),
                 description = CASE WHEN $4::TEXT IS NULL THEN description ELSE NULLIF($4::TEXT, '') END,
                 start_date = COALESCE($5, start_date),
                 end_date = COALESCE($6, end_date),
                 completed = COALESCE($7, completed),
                 updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {TODO_COLUMNS}"
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(owner)
            .bind(update.title)
            .bind(update.description)
            .bind(update.start_date)
            .bind(update.end_date)
            .bind(update.completed)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn delete_todo(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
