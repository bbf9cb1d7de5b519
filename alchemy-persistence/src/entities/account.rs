use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub image_name: String,
    pub wins: i32,
    pub losses: i32,
    pub created_at: DateTimeUtc,
    pub status: String,
    pub is_owner: bool,
    pub word_count: i32,
    pub new_word_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::unlocked::Entity")]
    Unlocked,
    #[sea_orm(has_many = "super::daily_challenge::Entity")]
    DailyChallenge,
}

impl Related<super::unlocked::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unlocked.def()
    }
}

impl Related<super::daily_challenge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyChallenge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
