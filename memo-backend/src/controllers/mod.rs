use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError, web};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::UserId;

pub mod auth;
pub mod health;
pub mod memos;

pub const SIGNUP_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const MEMOS_PATH: &str = "/top";

/// Largest accepted urlencoded form body. Memo content has no length limit of
/// its own.
pub const MAX_FORM_BYTES: usize = 4 * 1024 * 1024;

/// Register every route. Unknown paths are handled by [`not_found`], which
/// the caller installs as the app's default service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().limit(MAX_FORM_BYTES))
        .configure(health::config_routes)
        .configure(auth::config)
        .configure(memos::config);
}

pub async fn not_found() -> HttpResponse {
    AppError::NotFound.error_response()
}

/// 303 so that a POST is followed by a GET.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish()
}

pub fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

/// Name shown in the navigation bar for the signed-in user.
fn signed_in_name(state: &AppState, user_id: UserId) -> AppResult<Option<String>> {
    Ok(state.credentials.find_user(user_id)?.map(|u| u.user_name))
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::web;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    use crate::AppState;
    use crate::auth::session::SESSION_COOKIE;
    use crate::config::Config;
    use crate::db::Database;

    pub fn test_state() -> (TempDir, web::Data<AppState>) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db").to_str().unwrap().to_string();
        let config = Config::from_lookup(|name| match name {
            "DATABASE_URL" => Some(db_path.clone()),
            "PBKDF2_ITERATIONS" => Some("1000".to_string()),
            _ => None,
        })
        .unwrap();
        let db = Arc::new(Database::new(&config.database_url).unwrap());
        (dir, web::Data::new(AppState::new(config, db)))
    }

    pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.into_owned())
    }

    pub async fn body_text<B>(resp: ServiceResponse<B>) -> String
    where
        B: actix_web::body::MessageBody,
    {
        let bytes = actix_web::test::read_body(resp).await;
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Build the full router around `state`, the same way `main` does.
    macro_rules! init_app {
        ($state:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data($state.clone())
                    .configure($crate::controllers::configure)
                    .default_service(actix_web::web::to($crate::controllers::not_found)),
            )
            .await
        };
    }
    pub(crate) use init_app;
}
