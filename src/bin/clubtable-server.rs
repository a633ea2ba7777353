/// ClubTable WebSocket Server
///
/// Serves student, teacher and club table views over WebSocket, backed by
/// the club registration REST API.

use clubtable::config::Config;
use clubtable::server::run_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!("using API at {}", config.api_base_url);

    run_server(&config).await
}
