//! Presentation Layer
//!
//! HTTP handlers, DTOs, auth middleware, and the router.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use middleware::CurrentUser;
pub use router::{auth_router, auth_router_generic};
