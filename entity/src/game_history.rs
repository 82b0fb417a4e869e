use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "game_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub match_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub pacte_id: i32,
    pub result: String,
    pub processed_at: DateTimeUtc,
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
}

impl Related<super::pacte::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pacte.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
