use entity::{picnic_registration, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

pub async fn create<C: ConnectionTrait>(
    connection: &C,
    user_id: i32,
    picnic_id: i32,
) -> Result<picnic_registration::Model, DbErr> {
    picnic_registration::ActiveModel {
        user_id: Set(user_id),
        picnic_id: Set(picnic_id),
        ..Default::default()
    }
    .insert(connection)
    .await
}

/// The registration of `user_id` for `picnic_id`, if any.
pub async fn find<C: ConnectionTrait>(
    connection: &C,
    user_id: i32,
    picnic_id: i32,
) -> Result<Option<picnic_registration::Model>, DbErr> {
    picnic_registration::Entity::find()
        .filter(picnic_registration::Column::UserId.eq(user_id))
        .filter(picnic_registration::Column::PicnicId.eq(picnic_id))
        .one(connection)
        .await
}

/// Registrations of the given picnics together with the registered user, in registration order.
pub async fn with_users<C: ConnectionTrait>(
    connection: &C,
    picnic_ids: impl IntoIterator<Item = i32>,
) -> Result<Vec<(picnic_registration::Model, Option<user::Model>)>, DbErr> {
    picnic_registration::Entity::find()
        .filter(picnic_registration::Column::PicnicId.is_in(picnic_ids))
        .order_by_asc(picnic_registration::Column::Id)
        .find_also_related(user::Entity)
        .all(connection)
        .await
}
