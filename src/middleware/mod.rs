pub mod auth;
pub mod response;

pub use auth::{require_authentication, Principal};
pub use response::{link, render_fall_through, ApiResponse, ApiResult};
