use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "player")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub lobby_code: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub image_name: String,
    pub is_owner: bool,
    pub has_account: bool,
    pub target_word: String,
    pub points: i32,
    pub word_count: i32,
    pub new_word_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lobby::Entity",
        from = "Column::LobbyCode",
        to = "super::lobby::Column::LobbyCode",
        on_delete = "Cascade"
    )]
    Lobby,
}

impl Related<super::lobby::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lobby.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
