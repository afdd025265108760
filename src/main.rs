use dotenvy::dotenv;

use pushkind_dispatch::models::config::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    log::info!(
        "Starting dispatch bay server on {}:{}",
        server_config.address,
        server_config.port
    );

    pushkind_dispatch::run(server_config).await
}
