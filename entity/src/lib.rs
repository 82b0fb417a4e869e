//! SeaORM entities for the pacte bot schema.

pub mod prelude;

pub mod app_setting;
pub mod game_history;
pub mod pacte;
pub mod participant;
pub mod user;
