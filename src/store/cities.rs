use entity::city;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

pub async fn create<C: ConnectionTrait>(
    connection: &C,
    name: &str,
    weather: f64,
) -> Result<city::Model, DbErr> {
    city::ActiveModel {
        name: Set(name.into()),
        weather: Set(weather),
        ..Default::default()
    }
    .insert(connection)
    .await
}

pub async fn get<C: ConnectionTrait>(connection: &C, id: i32) -> Result<Option<city::Model>, DbErr> {
    city::Entity::find_by_id(id).one(connection).await
}

/// Exact match on the stored (canonical) name.
pub async fn find_by_name<C: ConnectionTrait>(
    connection: &C,
    name: &str,
) -> Result<Option<city::Model>, DbErr> {
    city::Entity::find()
        .filter(city::Column::Name.eq(name))
        .one(connection)
        .await
}

/// All cities, optionally only those whose name contains `q`, case-sensitive.
pub async fn filter<C: ConnectionTrait>(
    connection: &C,
    q: Option<&str>,
) -> Result<Vec<city::Model>, DbErr> {
    let mut cities = city::Entity::find()
        .order_by_asc(city::Column::Id)
        .all(connection)
        .await?;
    // Matched here rather than with LIKE, whose case folding and escape character differ per
    // backend.
    if let Some(q) = q {
        cities.retain(|city| city.name.contains(q));
    }
    Ok(cities)
}
