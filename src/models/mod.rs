pub mod account;

pub use account::{Account, AccountUpdate, NewAccount, normalize_email};
