use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::FromRef,
    routing::{get, post, MethodRouter},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use weather::{OpenWeather, WeatherLookup};

mod api;
pub mod config;
pub mod database;
mod error;
mod extract;
pub mod service;
mod store;
#[cfg(test)]
mod test_helper;
pub mod weather;

pub use config::Config;
pub use error::AppError;

#[derive(Debug)]
pub struct PicnicPlanner {
    pub db_connection: DatabaseConnection,
    pub weather: Arc<dyn WeatherLookup>,
}

impl PicnicPlanner {
    /// Connects to the database, creates missing tables and sets up the weather client.
    pub async fn new(config: &Config) -> Result<Self> {
        let db_connection = database::connect(&config.database_url).await?;
        let weather = OpenWeather::new(&config.weather)?;
        info!(weather_api = %config.weather.base_url, "Picnic planner ready");
        Ok(Self::from_parts(db_connection, Arc::new(weather)))
    }

    pub fn from_parts(db_connection: DatabaseConnection, weather: Arc<dyn WeatherLookup>) -> Self {
        Self {
            db_connection,
            weather,
        }
    }

    pub fn install_routes<State>(router: Router<State>) -> Router<State>
    where
        Arc<PicnicPlanner>: FromRef<State>,
        State: Clone + Send + Sync + 'static,
    {
        let router = route_both(router, "/cities/", get(api::list_cities).post(api::create_city));
        let router = route_both(router, "/users/", get(api::list_users).post(api::register_user));
        let router = route_both(
            router,
            "/picnics/",
            get(api::list_picnics).post(api::create_picnic),
        );
        let router = route_both(router, "/picnic-register/", post(api::register_for_picnic));

        router
            .merge(Scalar::with_url("/api", api::Doc::openapi()))
            .layer(TraceLayer::new_for_http())
    }
}

/// Routes `path` (which ends with a slash) and the same path without the trailing slash.
fn route_both<State>(
    router: Router<State>,
    path: &str,
    method_router: MethodRouter<State>,
) -> Router<State>
where
    State: Clone + Send + Sync + 'static,
{
    router
        .route(path.trim_end_matches('/'), method_router.clone())
        .route(path, method_router)
}
