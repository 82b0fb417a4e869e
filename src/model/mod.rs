//! Domain models passed between the data layer, the services and the bot.
//!
//! Repositories convert SeaORM entity models into these types at the data-layer
//! boundary so the rest of the crate never sees raw status strings.

pub mod event;
pub mod game_history;
pub mod pacte;
pub mod participant;
pub mod update;
pub mod user;
