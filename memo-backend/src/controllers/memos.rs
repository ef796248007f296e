//! Memo pages. Every handler starts with the session guard, and only then
//! reads the memo id or the form body, so anonymous requests are redirected
//! whatever their path or payload looks like.
//!
//! Memos form one shared workspace: any signed-in user may view, edit or
//! delete any memo. The author is recorded on creation only.

use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use serde::Deserialize;

use super::{MEMOS_PATH, html, redirect, signed_in_name};
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::MemoId;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct MemoForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

/// The `{id}` path segment. Anything that is not a number names no memo.
fn path_memo_id(req: &HttpRequest) -> AppResult<MemoId> {
    req.match_info()
        .get("id")
        .and_then(|raw| raw.parse().ok())
        .ok_or(AppError::NotFound)
}

/// Decode the urlencoded body, honouring the app's `FormConfig`.
async fn read_form(req: &HttpRequest, payload: web::Payload) -> Result<MemoForm, HttpResponse> {
    web::Form::<MemoForm>::from_request(req, &mut payload.into_inner())
        .await
        .map(web::Form::into_inner)
        .map_err(|e| e.error_response())
}

async fn list_memos(data: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let memos = data.memos.list()?;
    let name = signed_in_name(&data, user_id)?;
    Ok(html(StatusCode::OK, views::memo_list(name.as_deref(), &memos)))
}

async fn create_memo(
    data: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    let form = match read_form(&req, payload).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    match data.memos.create(&form.title, &form.content, user_id) {
        Ok(memo_id) => {
            log::info!("User {} created memo {}", user_id, memo_id);
            Ok(redirect(MEMOS_PATH))
        }
        Err(AppError::Validation(message)) => {
            let name = signed_in_name(&data, user_id)?;
            Ok(html(
                StatusCode::BAD_REQUEST,
                views::create_page(name.as_deref(), Some(&message), &form.title, &form.content),
            ))
        }
        Err(e) => Err(e),
    }
}

async fn create_form(data: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let name = signed_in_name(&data, user_id)?;
    Ok(html(StatusCode::OK, views::create_page(name.as_deref(), None, "", "")))
}

async fn memo_detail(data: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let memo = data.memos.get(path_memo_id(&req)?)?;
    let name = signed_in_name(&data, user_id)?;
    Ok(html(StatusCode::OK, views::detail_page(name.as_deref(), &memo)))
}

async fn edit_form(data: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let memo = data.memos.get(path_memo_id(&req)?)?;
    let name = signed_in_name(&data, user_id)?;
    Ok(html(
        StatusCode::OK,
        views::update_page(name.as_deref(), memo.id, None, &memo.title, &memo.content),
    ))
}

async fn update_memo(
    data: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let memo_id = path_memo_id(&req)?;
    let form = match read_form(&req, payload).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };
    match data.memos.update(memo_id, &form.title, &form.content) {
        Ok(()) => {
            log::info!("User {} updated memo {}", user_id, memo_id);
            Ok(redirect(MEMOS_PATH))
        }
        Err(AppError::Validation(message)) => {
            // Validation runs before the lookup, so make sure the memo exists
            // before offering to fix the form.
            data.memos.get(memo_id)?;
            let name = signed_in_name(&data, user_id)?;
            Ok(html(
                StatusCode::BAD_REQUEST,
                views::update_page(name.as_deref(), memo_id, Some(&message), &form.title, &form.content),
            ))
        }
        Err(e) => Err(e),
    }
}

async fn delete_memo(data: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let user_id = match data.sessions.require_authenticated(&req) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let memo_id = path_memo_id(&req)?;
    data.memos.delete(memo_id)?;
    log::info!("User {} deleted memo {}", user_id, memo_id);
    Ok(redirect(MEMOS_PATH))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(MEMOS_PATH)
            .route(web::get().to(list_memos))
            .route(web::post().to(create_memo)),
    )
    .service(web::resource("/create").route(web::get().to(create_form)))
    .service(web::resource("/detail/{id}").route(web::get().to(memo_detail)))
    .service(
        web::resource("/update/{id}")
            .route(web::get().to(edit_form))
            .route(web::post().to(update_memo)),
    )
    .service(web::resource("/delete/{id}").route(web::get().to(delete_memo)));
}
