use actix_web::{web, App, HttpServer};
use clap::Parser;

use server::config::Config;
use server::connection::ConnectionSettings;
use server::handlers;
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::debug!("{:?}", config);

    let srv_tx = spawn_server(config.server_buffer);
    let settings = ConnectionSettings {
        buffer: config.connection_buffer,
    };

    log::info!("Listening on http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(settings.clone()))
            .configure(handlers::root)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
