pub use super::app_setting::Entity as AppSetting;
pub use super::game_history::Entity as GameHistory;
pub use super::pacte::Entity as Pacte;
pub use super::participant::Entity as Participant;
pub use super::user::Entity as User;
