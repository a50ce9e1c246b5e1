use anyhow::{Context, Result};
use entity::{city, picnic, picnic_registration, user};
use sea_orm::{
    sea_query::Index, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

const REGISTRATION_PAIR_INDEX: &str = "idx_picnic_registrations_user_picnic";

/// Connects to the database and creates missing tables.
pub async fn connect(url: &str) -> Result<DatabaseConnection> {
    let connection = Database::connect(url)
        .await
        .context("Connecting to the database")?;
    create_tables(&connection)
        .await
        .context("Creating tables")?;
    Ok(connection)
}

/// Creates all tables and the registration pair index, unless they exist already.
pub async fn create_tables(connection: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(connection, user::Entity).await?;
    create_table(connection, city::Entity).await?;
    create_table(connection, picnic::Entity).await?;
    create_table(connection, picnic_registration::Entity).await?;

    let backend = connection.get_database_backend();
    let index = Index::create()
        .if_not_exists()
        .name(REGISTRATION_PAIR_INDEX)
        .table(picnic_registration::Entity)
        .col(picnic_registration::Column::UserId)
        .col(picnic_registration::Column::PicnicId)
        .unique()
        .to_owned();
    connection.execute(backend.build(&index)).await?;

    info!("Database schema ready");
    Ok(())
}

async fn create_table<E: EntityTrait>(connection: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = connection.get_database_backend();
    let schema = Schema::new(backend);
    let statement = backend.build(schema.create_table_from_entity(entity).if_not_exists());
    connection.execute(statement).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use anyhow::Result;
    use rstest::rstest;
    use sea_orm::DatabaseConnection;

    use super::create_tables;
    use crate::test_helper::database;

    #[rstest]
    #[tokio::test]
    async fn creating_tables_twice_is_harmless(
        database: impl Future<Output = Result<DatabaseConnection>>,
    ) -> Result<()> {
        let database = database.await?;
        create_tables(&database).await?;
        Ok(())
    }
}
