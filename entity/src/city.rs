use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Canonical (capitalized) name.
    #[sea_orm(unique)]
    pub name: String,
    /// Temperature at the time the city was first created. Never refreshed.
    pub weather: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::picnic::Entity")]
    Picnic,
}

impl Related<super::picnic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Picnic.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
