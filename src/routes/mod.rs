pub mod health;
pub mod todos;
pub mod users;

use std::sync::Arc;

use actix_web::web;

use crate::auth::{BearerAuth, TokenService};
use crate::error::AppError;
use crate::store::{TodoStore, UserStore};

/// Registers the `/user` and `/todo` scopes. Every `/todo` route requires a bearer token.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(users::login)
            .service(users::create_user)
            .service(users::list_users)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/todo")
            .wrap(BearerAuth)
            .service(todos::list_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}

/// Builds an `App::configure` callback that registers the shared state and every route.
///
/// JSON and path extraction errors are rendered through `AppError` so every
/// failure carries a `{"message": ...}` body.
pub fn configure_app<S>(
    store: Arc<S>,
    tokens: TokenService,
) -> impl Fn(&mut web::ServiceConfig) + Clone
where
    S: UserStore + TodoStore + 'static,
{
    move |cfg: &mut web::ServiceConfig| {
        let users: Arc<dyn UserStore> = store.clone();
        let todos: Arc<dyn TodoStore> = store.clone();

        cfg.app_data(web::Data::from(users))
            .app_data(web::Data::from(todos))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::NotFound(format!("Invalid id: {}", err)).into()
            }))
            .service(health::health)
            .configure(config);
    }
}
