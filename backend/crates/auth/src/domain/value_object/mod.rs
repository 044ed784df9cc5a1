//! Value Objects

pub mod email;
pub mod ids;
pub mod password;
pub mod user_name;

pub use email::Email;
pub use ids::{OneTimeTokenId, SessionId, UserId};
pub use password::{PasswordHash, RawPassword};
pub use user_name::UserName;
