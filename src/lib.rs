#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "User accounts with bcrypt-hashed passwords, HS256 bearer tokens, and todo"]
#![doc = "records scoped to their owner. The binary (`main.rs`) wires these pieces into"]
#![doc = "an actix-web server backed by Postgres."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
