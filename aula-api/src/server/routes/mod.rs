use crate::server::ServerRouter;
use axum::Router;

mod careers;
mod health;
mod menu;
mod posts;
mod saved;
mod users;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(health::routes())
        .merge(posts::routes())
        .merge(users::routes())
        .merge(careers::routes())
        .merge(saved::routes())
        .merge(menu::routes())
}
