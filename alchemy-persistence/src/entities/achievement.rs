use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "achievement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub title: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub value: String,
    pub description: String,
    pub image_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::unlocked::Entity")]
    Unlocked,
}

impl Related<super::unlocked::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unlocked.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
