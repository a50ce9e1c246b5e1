use chrono::{DateTime, Utc};
use entity::{city, picnic};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

pub async fn create<C: ConnectionTrait>(
    connection: &C,
    city_id: i32,
    time: DateTime<Utc>,
) -> Result<picnic::Model, DbErr> {
    picnic::ActiveModel {
        city_id: Set(city_id),
        time: Set(time),
        ..Default::default()
    }
    .insert(connection)
    .await
}

pub async fn get<C: ConnectionTrait>(connection: &C, id: i32) -> Result<Option<picnic::Model>, DbErr> {
    picnic::Entity::find_by_id(id).one(connection).await
}

/// All picnics with their city.
///
/// `at` restricts to picnics at exactly that time, `not_before` drops the ones before it.
pub async fn filter<C: ConnectionTrait>(
    connection: &C,
    at: Option<DateTime<Utc>>,
    not_before: Option<DateTime<Utc>>,
) -> Result<Vec<(picnic::Model, Option<city::Model>)>, DbErr> {
    let mut query = picnic::Entity::find();
    if let Some(at) = at {
        query = query.filter(picnic::Column::Time.eq(at));
    }
    if let Some(not_before) = not_before {
        query = query.filter(picnic::Column::Time.gte(not_before));
    }
    query
        .order_by_asc(picnic::Column::Id)
        .find_also_related(city::Entity)
        .all(connection)
        .await
}
