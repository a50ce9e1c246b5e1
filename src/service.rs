//! One function per use case. Each checks its business rules, then writes at most once.
//!
//! Writes run inside a single transaction. Returning early drops the transaction, so a failed
//! check never leaves a partial write behind.

use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use entity::{city, picnic, picnic_registration, user};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, SqlErr, TransactionTrait};
use tracing::{debug, info, warn};

use crate::{
    store::{cities, picnics, registrations, users},
    weather::WeatherLookup,
    AppError,
};

/// A picnic together with the city it takes place in.
#[derive(Debug, Clone, PartialEq)]
pub struct PicnicDetail {
    pub picnic: picnic::Model,
    pub city: city::Model,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDetail {
    pub registration: picnic_registration::Model,
    pub user: user::Model,
    pub picnic: PicnicDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PicnicListing {
    pub picnic: PicnicDetail,
    /// In registration order.
    pub users: Vec<user::Model>,
}

/// The form city names are stored and compared in: first character uppercased, the rest
/// lowercased.
pub fn canonical_city_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub async fn register_user(
    connection: &DatabaseConnection,
    name: &str,
    surname: &str,
    age: i32,
) -> Result<user::Model, AppError> {
    let txn = connection.begin().await?;
    let user = users::create(&txn, name, surname, age).await?;
    txn.commit().await?;

    info!("User id:{} registered", user.id);
    Ok(user)
}

/// Returns the city with the canonical form of `name`, creating it if needed.
pub async fn create_city(
    connection: &DatabaseConnection,
    weather: &dyn WeatherLookup,
    name: &str,
) -> Result<city::Model, AppError> {
    let name = canonical_city_name(name);

    if !weather.check_existing(&name).await {
        return Err(AppError::InvalidCity(name));
    }

    if let Some(city) = cities::find_by_name(connection, &name).await? {
        debug!("City `{name}` already known as id:{}", city.id);
        return Ok(city);
    }

    let current = weather.current_weather(&name).await.map_err(|e| {
        warn!("No weather for `{name}`: {e:#}");
        AppError::InvalidCity(name.clone())
    })?;

    let txn = connection.begin().await?;
    match cities::create(&txn, &name, current).await {
        Ok(city) => {
            txn.commit().await?;
            info!("City `{}` created with id:{}", city.name, city.id);
            Ok(city)
        }
        Err(e) if is_unique_violation(&e) => {
            // Lost a race against a concurrent request creating the same city.
            txn.rollback().await?;
            cities::find_by_name(connection, &name)
                .await?
                .ok_or(AppError::Database(e))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn create_picnic(
    connection: &DatabaseConnection,
    city_id: i32,
    time: DateTime<Utc>,
) -> Result<PicnicDetail, AppError> {
    let txn = connection.begin().await?;

    let city = cities::get(&txn, city_id)
        .await?
        .ok_or(AppError::UnknownCity(city_id))?;
    let picnic = picnics::create(&txn, city.id, time).await?;

    txn.commit().await?;

    info!("Picnic id:{} created in `{}` at {}", picnic.id, city.name, picnic.time);
    Ok(PicnicDetail { picnic, city })
}

/// Registers a user for a picnic.
///
/// Checks run in a fixed order: duplicate registration first, then the user, then the
/// picnic.
pub async fn register_for_picnic(
    connection: &DatabaseConnection,
    user_id: i32,
    picnic_id: i32,
) -> Result<RegistrationDetail, AppError> {
    let duplicate = AppError::DuplicateRegistration { user_id, picnic_id };

    let txn = connection.begin().await?;

    if registrations::find(&txn, user_id, picnic_id).await?.is_some() {
        return Err(duplicate);
    }
    let user = users::get(&txn, user_id)
        .await?
        .ok_or(AppError::UnknownUser(user_id))?;
    let picnic = picnics::get(&txn, picnic_id)
        .await?
        .ok_or(AppError::UnknownPicnic(picnic_id))?;
    let city = cities::get(&txn, picnic.city_id)
        .await?
        .ok_or_else(|| missing_city(&picnic))?;

    let registration = match registrations::create(&txn, user_id, picnic_id).await {
        Ok(registration) => registration,
        Err(e) if is_unique_violation(&e) => return Err(duplicate),
        Err(e) => return Err(e.into()),
    };

    txn.commit().await?;

    info!("User id:{user_id} registered for picnic id:{picnic_id}");
    Ok(RegistrationDetail {
        registration,
        user,
        picnic: PicnicDetail { picnic, city },
    })
}

pub async fn list_cities<C: ConnectionTrait>(
    connection: &C,
    q: Option<&str>,
) -> Result<Vec<city::Model>, AppError> {
    Ok(cities::filter(connection, q).await?)
}

pub async fn list_users<C: ConnectionTrait>(
    connection: &C,
    min_age: Option<i32>,
    max_age: Option<i32>,
) -> Result<Vec<user::Model>, AppError> {
    Ok(users::filter(connection, min_age, max_age).await?)
}

/// Lists picnics with their city and registered users.
///
/// Without `include_past`, picnics before `now` are left out.
pub async fn list_picnics<C: ConnectionTrait>(
    connection: &C,
    at: Option<DateTime<Utc>>,
    include_past: bool,
    now: DateTime<Utc>,
) -> Result<Vec<PicnicListing>, AppError> {
    let not_before = (!include_past).then_some(now);
    let rows = picnics::filter(connection, at, not_before).await?;

    let picnic_ids: Vec<i32> = rows.iter().map(|(picnic, _)| picnic.id).collect();
    let mut users_by_picnic: HashMap<i32, Vec<user::Model>> = HashMap::new();
    for (registration, user) in registrations::with_users(connection, picnic_ids).await? {
        if let Some(user) = user {
            users_by_picnic
                .entry(registration.picnic_id)
                .or_default()
                .push(user);
        }
    }

    rows.into_iter()
        .map(|(picnic, city)| {
            let city = city.ok_or_else(|| missing_city(&picnic))?;
            let users = users_by_picnic.remove(&picnic.id).unwrap_or_default();
            Ok(PicnicListing {
                picnic: PicnicDetail { picnic, city },
                users,
            })
        })
        .collect()
}

fn missing_city(picnic: &picnic::Model) -> AppError {
    anyhow!(
        "Picnic id:{} references missing city id:{}",
        picnic.id,
        picnic.city_id
    )
    .into()
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
