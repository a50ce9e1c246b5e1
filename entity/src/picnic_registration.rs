use sea_orm::entity::prelude::*;

/// A user's registration for a picnic. `(user_id, picnic_id)` is unique, see
/// the index created at startup.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "picnic_registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub picnic_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::picnic::Entity",
        from = "Column::PicnicId",
        to = "super::picnic::Column::Id"
    )]
    Picnic,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::picnic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Picnic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
