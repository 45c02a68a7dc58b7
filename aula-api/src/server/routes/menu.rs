use crate::server::{Result, ServerError, ServerRouter, extract::Json, identity::Identity};
use aula_common::model::profile::{CAREER_UNAVAILABLE_LABEL, MenuContext};
use aula_db::client::DbClient;
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tokio::join;
use tracing::warn;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(get_menu)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/menu", rejection(ServerError))]
struct MenuPath();

/// The profile leg has a useful degraded form; the saved lists do not, so
/// their failures surface instead of masquerading as empty.
async fn get_menu(
    MenuPath(): MenuPath,
    State(db): State<Arc<DbClient>>,
    identity: Identity,
) -> Result<Json<MenuContext>> {
    let user_id = identity.user_id();
    let (profile, saved_careers, saved_posts) = join!(
        db.resolve_profile(user_id),
        db.list_saved_careers(user_id),
        db.list_saved_posts(user_id),
    );

    let career_label = match profile {
        Ok(Some(profile)) => profile.career_label().to_owned(),
        Ok(None) => {
            warn!(%user_id, "Menu requested for an unknown user");
            CAREER_UNAVAILABLE_LABEL.to_owned()
        }
        Err(error) => {
            warn!(%user_id, %error, "Profile resolution failed, degrading the menu label");
            CAREER_UNAVAILABLE_LABEL.to_owned()
        }
    };

    Ok(Json(MenuContext {
        career_label,
        saved_careers: saved_careers?,
        saved_posts: saved_posts?,
    }))
}
