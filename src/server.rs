/// HTTP server with WebSocket support for table views
use actix_web::{middleware, web, App, Error, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use std::sync::Arc;

use crate::config::Config;
use crate::http::HttpSource;
use crate::websocket::{AppState, ViewSocket};

/// WebSocket endpoint handler
async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let resp = ws::start(ViewSocket::new(state), &req, stream)?;
    Ok(resp)
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "ClubTable WebSocket server is running"
    }))
}

/// Register the WebSocket and health routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_index))
        .route("/health", web::get().to(health_check));
}

/// Start the server against the REST API named in `config`.
pub async fn run_server(config: &Config) -> std::io::Result<()> {
    let source = HttpSource::new(config.api_base_url.clone());
    let state = AppState::new(Arc::new(source), config.page_size);
    serve(&config.host, config.port, state).await
}

/// Start the server with an explicit record source.
pub async fn serve(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    log::info!("websocket: ws://{}:{}/ws", host, port);
    log::info!("health check: http://{}:{}/health", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // CORS for development
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let state = web::Data::new(AppState::new(Arc::new(MemorySource::new()), 10));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }
}
