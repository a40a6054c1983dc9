mod auth;
mod health_check;
mod users;

pub use auth::{change_password, login, logout, refresh, register};
pub use health_check::health_check;
pub use users::{current_user, update_account, update_avatar, update_cover_image};
