use clap::Parser;
use std::path::Path;
use tracing::{info, warn};

use placement_portal::{
    config::{Config, StartArgs},
    db,
    resource::db::ResourceDb,
    router,
    state::Portal,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let StartArgs {
        config_path,
        address: host,
        port,
        log_level: level,
    } = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = if Path::new(&config_path).exists() {
        Config::read(&config_path).expect("invalid config file")
    } else {
        warn!("{config_path} not found, using defaults");
        Config::default()
    };

    let db_url = config.database_url().expect("no database configured");
    let db_pool = db::create_pool(&db_url, config.max_connections)
        .await
        .expect("error while connecting to db");

    db::migrate(&db_pool).await.expect("error in migrations");

    let Config {
        segment_policy,
        leaderboard_size,
        ..
    } = config;

    let state = Portal::new(
        ResourceDb::new(db_pool),
        segment_policy,
        leaderboard_size,
    );

    let addr = format!("{host}:{port}");

    info!("Now listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("error while starting TCP listener");

    axum::serve(listener, router::router(state))
        .await
        .expect("error while starting server");
}
