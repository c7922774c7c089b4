pub mod todo;
pub mod user;

pub use todo::{Todo, TodoInput, TodoUpdate};
pub use user::{NewUser, User, UserChanges, UserInput, UserUpdate};
