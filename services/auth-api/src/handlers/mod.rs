//! HTTP handlers

mod auth;
mod health;

pub use auth::{
    admin_role, authority_read1, authority_read1_or_2, authority_read2, login, protected,
    user_or_admin_role, user_role, LoginRequest,
};
pub use health::health;
