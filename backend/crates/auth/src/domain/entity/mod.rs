//! Domain Entities

pub mod one_time_token;
pub mod session;
pub mod user;

pub use one_time_token::OneTimeToken;
pub use session::Session;
pub use user::User;
