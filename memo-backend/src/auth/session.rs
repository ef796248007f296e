//! Session authenticator.
//!
//! A signed-in browser carries a random session token in the `memo_session`
//! cookie. The cookie is private (encrypted and authenticated with the process
//! secret key), and the token must also match a live `auth_sessions` row, so
//! logout and expiry are enforced server-side. The cookie itself carries no
//! `Max-Age`: it lives for the browser session, and the sliding expiry of the
//! row decides how long it stays usable.

use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use chrono::Duration;
use std::sync::Arc;

use crate::config::defaults::MAX_SESSION_TTL_HOURS;
use crate::controllers::{LOGIN_PATH, redirect};
use crate::db::Database;
use crate::error::AppResult;
use crate::models::UserId;

pub const SESSION_COOKIE: &str = "memo_session";

pub struct SessionAuthenticator {
    db: Arc<Database>,
    key: Key,
    ttl: Duration,
    secure: bool,
}

impl SessionAuthenticator {
    pub fn new(db: Arc<Database>, key: Key, ttl_hours: i64, secure: bool) -> Self {
        Self {
            db,
            key,
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
            secure,
        }
    }

    /// Establish a session for `user_id` and return the cookie to set.
    ///
    /// A request that already holds a live session for the same user keeps it.
    /// A live session for a different user is ended first.
    pub fn login(&self, req: &HttpRequest, user_id: UserId) -> AppResult<Cookie<'static>> {
        if let Some(token) = self.session_token(req) {
            match self.db.validate_session(&token, self.ttl)? {
                Some(session) if session.user_id == user_id => {
                    log::debug!("User {} already signed in, reusing session", user_id);
                    return Ok(self.seal(token));
                }
                Some(_) => {
                    self.db.delete_session(&token)?;
                }
                None => {}
            }
        }

        let session = self.db.create_session(user_id, self.ttl)?;
        log::info!("User {} signed in (session {})", user_id, session.id);
        Ok(self.seal(session.token))
    }

    /// End the current session (if any) and return a cookie that clears it.
    pub fn logout(&self, req: &HttpRequest) -> AppResult<Cookie<'static>> {
        if let Some(token) = self.session_token(req) {
            if self.db.delete_session(&token)? {
                log::info!("Session ended");
            }
        }
        let mut removal = self.cookie_template(String::new());
        removal.make_removal();
        Ok(removal)
    }

    /// The signed-in user, or `None` for a missing, tampered or expired session.
    pub fn current_user(&self, req: &HttpRequest) -> AppResult<Option<UserId>> {
        let Some(token) = self.session_token(req) else {
            return Ok(None);
        };
        Ok(self
            .db
            .validate_session(&token, self.ttl)?
            .map(|session| session.user_id))
    }

    /// Guard for protected handlers: the signed-in user, or the response to
    /// return instead (a redirect to the login page).
    pub fn require_authenticated(&self, req: &HttpRequest) -> Result<UserId, HttpResponse> {
        match self.current_user(req) {
            Ok(Some(user_id)) => Ok(user_id),
            Ok(None) => {
                log::debug!("Anonymous request to {} sent to login", req.path());
                Err(redirect(LOGIN_PATH))
            }
            Err(e) => Err(e.error_response()),
        }
    }

    fn session_token(&self, req: &HttpRequest) -> Option<String> {
        let cookie = req.cookie(SESSION_COOKIE)?;
        let mut jar = CookieJar::new();
        jar.add_original(cookie);
        let opened = jar.private(&self.key).get(SESSION_COOKIE)?;
        let token = opened.value();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn seal(&self, token: String) -> Cookie<'static> {
        let mut jar = CookieJar::new();
        jar.private_mut(&self.key).add(self.cookie_template(token));
        jar.get(SESSION_COOKIE)
            .cloned()
            .unwrap_or_else(|| self.cookie_template(String::new()))
    }

    fn cookie_template(&self, value: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .finish()
    }
}
