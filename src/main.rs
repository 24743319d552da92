use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;

use eventboard_server::config::Config;
use eventboard_server::routes::create_routes;
use eventboard_server::state::AppState;
use eventboard_server::{db, init_tracing};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    let pool = db::connect(&config)
        .await
        .expect("Failed to prepare database");

    let app: Router = create_routes(&config, AppState::new(pool));

    let addr = config.bind_addr();
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
