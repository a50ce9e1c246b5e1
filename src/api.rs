use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use entity::{city, user};
use utoipa::OpenApi;

use crate::{
    extract::{ValidJson, ValidQuery},
    service::{self, PicnicDetail, PicnicListing, RegistrationDetail},
    AppError, PicnicPlanner,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        create_city,
        list_cities,
        list_users,
        register_user,
        list_picnics,
        create_picnic,
        register_for_picnic
    ),
    components(schemas(
        api::CreateCity,
        api::City,
        api::RegisterUser,
        api::User,
        api::CreatePicnic,
        api::Picnic,
        api::PicnicWithUsers,
        api::RegisterForPicnic,
        api::Registration,
        api::ErrorResponse
    )),
    tags(
        (name = "picnic-planner", description = "Picnic Planner API")
    )
)]
pub struct Doc;

/// Creates a city, or returns the existing one with the same name.
#[utoipa::path(
    post,
    path = "/cities/",
    request_body = api::CreateCity,
    responses(
        (status = 200, description = "The created or already existing city", body = api::City),
        (status = 400, description = "The weather provider does not know the city", body = api::ErrorResponse)
    )
)]
pub async fn create_city(
    State(state): State<Arc<PicnicPlanner>>,
    ValidJson(body): ValidJson<api::CreateCity>,
) -> Result<Json<api::City>, AppError> {
    let city = service::create_city(&state.db_connection, state.weather.as_ref(), &body.name).await?;
    Ok(Json(city_body(city)))
}

#[utoipa::path(
    get,
    path = "/cities/",
    params(api::ListCities),
    responses((status = 200, body = [api::City]))
)]
pub async fn list_cities(
    State(state): State<Arc<PicnicPlanner>>,
    ValidQuery(query): ValidQuery<api::ListCities>,
) -> Result<Json<Vec<api::City>>, AppError> {
    let cities = service::list_cities(&state.db_connection, query.q.as_deref()).await?;
    Ok(Json(cities.into_iter().map(city_body).collect()))
}

#[utoipa::path(
    get,
    path = "/users/",
    params(api::ListUsers),
    responses(
        (status = 200, body = [api::User]),
        (status = 400, description = "Age bound outside of 0..=120", body = api::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<Arc<PicnicPlanner>>,
    ValidQuery(query): ValidQuery<api::ListUsers>,
) -> Result<Json<Vec<api::User>>, AppError> {
    let users = service::list_users(&state.db_connection, query.min_age, query.max_age).await?;
    Ok(Json(users.into_iter().map(user_body).collect()))
}

#[utoipa::path(
    post,
    path = "/users/",
    request_body = api::RegisterUser,
    responses(
        (status = 200, body = api::User),
        (status = 400, description = "Invalid user data", body = api::ErrorResponse)
    )
)]
pub async fn register_user(
    State(state): State<Arc<PicnicPlanner>>,
    ValidJson(body): ValidJson<api::RegisterUser>,
) -> Result<Json<api::User>, AppError> {
    let user = service::register_user(&state.db_connection, &body.name, &body.surname, body.age).await?;
    Ok(Json(user_body(user)))
}

#[utoipa::path(
    get,
    path = "/picnics/",
    params(api::ListPicnics),
    responses((status = 200, body = [api::PicnicWithUsers]))
)]
pub async fn list_picnics(
    State(state): State<Arc<PicnicPlanner>>,
    ValidQuery(query): ValidQuery<api::ListPicnics>,
) -> Result<Json<Vec<api::PicnicWithUsers>>, AppError> {
    let listings =
        service::list_picnics(&state.db_connection, query.datetime, query.past, Utc::now()).await?;
    Ok(Json(listings.into_iter().map(listing_body).collect()))
}

#[utoipa::path(
    post,
    path = "/picnics/",
    request_body = api::CreatePicnic,
    responses(
        (status = 200, body = api::Picnic),
        (status = 400, description = "The city does not exist", body = api::ErrorResponse)
    )
)]
pub async fn create_picnic(
    State(state): State<Arc<PicnicPlanner>>,
    ValidJson(body): ValidJson<api::CreatePicnic>,
) -> Result<Json<api::Picnic>, AppError> {
    let picnic = service::create_picnic(&state.db_connection, body.city_id, body.time).await?;
    Ok(Json(picnic_body(picnic)))
}

/// Registers a user for a picnic, at most once per picnic.
#[utoipa::path(
    post,
    path = "/picnic-register/",
    request_body = api::RegisterForPicnic,
    responses(
        (status = 200, body = api::Registration),
        (status = 400, description = "Duplicate registration, unknown user or unknown picnic", body = api::ErrorResponse)
    )
)]
pub async fn register_for_picnic(
    State(state): State<Arc<PicnicPlanner>>,
    ValidJson(body): ValidJson<api::RegisterForPicnic>,
) -> Result<Json<api::Registration>, AppError> {
    let registration =
        service::register_for_picnic(&state.db_connection, body.user_id, body.picnic_id).await?;
    Ok(Json(registration_body(registration)))
}

fn city_body(city: city::Model) -> api::City {
    api::City {
        id: city.id,
        name: city.name,
        weather: city.weather,
    }
}

fn user_body(user: user::Model) -> api::User {
    api::User {
        id: user.id,
        name: user.name,
        surname: user.surname,
        age: user.age,
    }
}

fn picnic_body(PicnicDetail { picnic, city }: PicnicDetail) -> api::Picnic {
    api::Picnic {
        id: picnic.id,
        city: city.name,
        time: picnic.time,
    }
}

fn listing_body(PicnicListing { picnic, users }: PicnicListing) -> api::PicnicWithUsers {
    let picnic = picnic_body(picnic);
    api::PicnicWithUsers {
        id: picnic.id,
        city: picnic.city,
        time: picnic.time,
        users: users.into_iter().map(user_body).collect(),
    }
}

fn registration_body(detail: RegistrationDetail) -> api::Registration {
    api::Registration {
        id: detail.registration.id,
        user: user_body(detail.user),
        picnic: picnic_body(detail.picnic),
    }
}
