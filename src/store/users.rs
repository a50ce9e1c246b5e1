use entity::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

pub async fn create<C: ConnectionTrait>(
    connection: &C,
    name: &str,
    surname: &str,
    age: i32,
) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        name: Set(name.into()),
        surname: Set(surname.into()),
        age: Set(age),
        ..Default::default()
    }
    .insert(connection)
    .await
}

pub async fn get<C: ConnectionTrait>(connection: &C, id: i32) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(id).one(connection).await
}

/// All users, optionally within an inclusive age range.
pub async fn filter<C: ConnectionTrait>(
    connection: &C,
    min_age: Option<i32>,
    max_age: Option<i32>,
) -> Result<Vec<user::Model>, DbErr> {
    let mut query = user::Entity::find();
    if let Some(min_age) = min_age {
        query = query.filter(user::Column::Age.gte(min_age));
    }
    if let Some(max_age) = max_age {
        query = query.filter(user::Column::Age.lte(max_age));
    }
    query.order_by_asc(user::Column::Id).all(connection).await
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use anyhow::Result;
    use rstest::rstest;
    use sea_orm::DatabaseConnection;

    use crate::test_helper::database;

    #[rstest]
    #[tokio::test]
    async fn age_range_is_inclusive(
        database: impl Future<Output = Result<DatabaseConnection>>,
    ) -> Result<()> {
        let database = database.await?;
        for (name, age) in [("Ann", 29), ("Bob", 30), ("Cid", 31), ("Dan", 30)] {
            super::create(&database, name, "Smith", age).await?;
        }

        let names = |users: Vec<entity::user::Model>| {
            users.into_iter().map(|u| u.name).collect::<Vec<_>>()
        };

        assert_eq!(names(super::filter(&database, Some(30), Some(30)).await?), ["Bob", "Dan"]);
        assert_eq!(names(super::filter(&database, Some(30), None).await?), ["Bob", "Cid", "Dan"]);
        assert_eq!(names(super::filter(&database, None, Some(29)).await?), ["Ann"]);
        assert_eq!(super::filter(&database, None, None).await?.len(), 4);
        assert!(super::filter(&database, Some(31), Some(30)).await?.is_empty());
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn get_missing_user(database: impl Future<Output = Result<DatabaseConnection>>) -> Result<()> {
        let database = database.await?;
        assert!(super::get(&database, 42).await?.is_none());
        Ok(())
    }
}
