use dotenvy::dotenv;
use flightbook::api::{self, AppState};
use flightbook::{Error, Settings, database, seed};
use flightbook_orm::Database;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env()?;
    let db = Database::connect(&settings.database_url).await?;

    if settings.seed_data {
        seed::init_users(&db, settings.bcrypt_cost).await?;
    } else {
        database::migrate(&db).await?;
    }

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    log::info!("listening on http://{}", settings.bind_address);

    let app = api::router(AppState::new(db, settings));
    axum::serve(listener, app).await.map_err(|e| Error::Server(e.to_string()))
}
