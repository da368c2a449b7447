pub mod account;
pub mod activation;
pub mod health;
pub mod login;
pub mod logout;
pub mod password_reset;
pub mod register;

pub use account::update_account;
pub use activation::activate_account;
pub use health::health_check;
pub use login::{login, login_with_remember};
pub use logout::logout;
pub use password_reset::{request_password_reset, reset_password};
pub use register::register;
