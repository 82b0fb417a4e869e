use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "participant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pacte_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub joined_at: DateTimeUtc,
    pub signed_at: Option<DateTimeUtc>,
    pub left_at: Option<DateTimeUtc>,
    pub kicked_at: Option<DateTimeUtc>,
    pub kick_reason: Option<String>,
    pub kicked_by: Option<String>,
    pub points_gained: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pacte::Entity",
        from = "Column::PacteId",
        to = "super::pacte::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Pacte,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::DiscordId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::pacte::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pacte.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
