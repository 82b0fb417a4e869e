//! Factory methods for creating test data.
//!
//! Each entity has its own factory module with a `Factory` struct for customization
//! and a `create_*` convenience function for quick default creation.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let user = factory::user::create_user(&db).await?;
//! let pacte = factory::pacte::PacteFactory::new(&db).objective(5).active().build().await?;
//! factory::participant::create_signed_participant(&db, pacte.id, &user.discord_id).await?;
//!
//! let (pacte, users) = factory::helpers::create_active_pacte_with_players(&db, 3, 3).await?;
//! ```
//!
//! # Available Factories
//!
//! - `user` - Registered players
//! - `pacte` - Pactes in any status
//! - `participant` - Pacte membership rows
//! - `game_history` - Processed match ledger rows
//! - `helpers` - Unique ids and multi-entity setups

pub mod game_history;
pub mod helpers;
pub mod pacte;
pub mod participant;
pub mod user;

pub use game_history::create_game_history;
pub use pacte::create_pacte;
pub use participant::{create_participant, create_signed_participant};
pub use user::create_user;
