use actix_web::{HttpResponse, Responder, web};

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database_ok = match state.db.conn() {
        Ok(conn) => conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok(),
        Err(e) => {
            log::warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    let body = serde_json::json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "version": VERSION,
        "database": database_ok,
        "uptime_secs": state.started_at.elapsed().as_secs(),
    });

    if database_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

async fn get_version() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "version": VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    use crate::controllers::test_support::{init_app, test_state};

    #[actix_web::test]
    async fn test_health_is_public() {
        let (_dir, state) = test_state();
        let app = init_app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
        assert_eq!(body["database"], true);
    }

    #[actix_web::test]
    async fn test_version() {
        let (_dir, state) = test_state();
        let app = init_app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/version").to_request()).await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["version"], VERSION);
    }
}
