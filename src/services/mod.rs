pub mod account;
pub mod auth;
pub mod credential;
pub mod digest;
pub mod email;
pub mod password_reset;
pub mod registration;

pub use account::AccountService;
pub use auth::AuthService;
pub use credential::CredentialService;
pub use email::{EmailService, Notifier};
pub use password_reset::PasswordResetService;
pub use registration::RegistrationService;
