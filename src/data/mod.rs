//! Database repository layer.
//!
//! Repositories own every query against the pacte tables and convert entity models into
//! domain models at this boundary. They are generic over the connection, so the same
//! repository works on a `DatabaseConnection` or inside a caller's `DatabaseTransaction`.

pub mod app_setting;
pub mod game_history;
pub mod pacte;
pub mod user;
