mod db;
mod routes;
mod services;
mod state;

use services::persistence::env_parse;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = env_parse("PORT", DEFAULT_PORT);

    let pool = match std::env::var("DATABASE_URL") {
        Ok(database_url) => Some(db::init_pool(&database_url).await?),
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; floors are kept in memory only");
            None
        }
    };

    let state = state::AppState::new(pool.clone());

    let _persistence = pool.map(|pool| services::persistence::spawn_persistence_task(state.clone(), pool));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "floorplan listening");
    axum::serve(listener, app).await?;
    Ok(())
}
