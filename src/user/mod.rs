//! Users: registration, credential checks, and lookups.

mod core;
mod log_in_endpoint;
mod lookup_endpoint;
mod models;
mod register_endpoint;

pub use core::{
    DEFAULT_USER_NAME, NewUser, PasswordHash, User, create_user_table, get_user,
    get_user_by_email, register_user, verify_credentials,
};
pub use log_in_endpoint::{LogInRequest, log_in_endpoint};
pub use lookup_endpoint::{get_user_by_email_endpoint, get_user_endpoint};
pub use models::UserResponse;
pub use register_endpoint::{RegisterRequest, RegisterResponse, register_endpoint};
