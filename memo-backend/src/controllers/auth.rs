//! Sign up, log in and log out.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use super::{LOGIN_PATH, MEMOS_PATH, SIGNUP_PATH, html, redirect, redirect_with_cookie};
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::views;

/// Form body shared by the sign-up and login pages.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    user_name: String,
    #[serde(default)]
    user_password: String,
}

async fn signup_form() -> HttpResponse {
    html(StatusCode::OK, views::signup_page(None, ""))
}

async fn signup(
    data: web::Data<AppState>,
    form: web::Form<CredentialsForm>,
) -> AppResult<HttpResponse> {
    match data.credentials.register(&form.user_name, &form.user_password) {
        Ok(user_id) => {
            log::info!("Registered user {}", user_id);
            Ok(redirect(LOGIN_PATH))
        }
        Err(e @ AppError::DuplicateUsername) => Ok(html(
            StatusCode::CONFLICT,
            views::signup_page(Some(&e.to_string()), &form.user_name),
        )),
        Err(AppError::Validation(message)) => Ok(html(
            StatusCode::BAD_REQUEST,
            views::signup_page(Some(&message), &form.user_name),
        )),
        Err(e) => Err(e),
    }
}

async fn login_form() -> HttpResponse {
    html(StatusCode::OK, views::login_page(None, ""))
}

async fn login(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<CredentialsForm>,
) -> AppResult<HttpResponse> {
    if form.user_name.is_empty() || form.user_password.is_empty() {
        return Ok(html(
            StatusCode::BAD_REQUEST,
            views::login_page(Some("Username and password are required"), &form.user_name),
        ));
    }

    match data.credentials.verify(&form.user_name, &form.user_password) {
        Ok(user_id) => {
            let cookie = data.sessions.login(&req, user_id)?;
            Ok(redirect_with_cookie(MEMOS_PATH, cookie))
        }
        Err(e @ AppError::AuthFailure) => {
            log::info!("Failed login attempt");
            Ok(html(
                StatusCode::UNAUTHORIZED,
                views::login_page(Some(&e.to_string()), &form.user_name),
            ))
        }
        Err(e) => Err(e),
    }
}

async fn logout(data: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    if let Err(resp) = data.sessions.require_authenticated(&req) {
        return Ok(resp);
    }
    let removal = data.sessions.logout(&req)?;
    Ok(redirect_with_cookie(SIGNUP_PATH, removal))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(SIGNUP_PATH)
            .route(web::get().to(signup_form))
            .route(web::post().to(signup)),
    )
    .service(
        web::resource(LOGIN_PATH)
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    )
    .service(web::resource("/logout").route(web::get().to(logout)));
}
