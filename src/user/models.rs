//! Wire representations of users.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{currency::Currency, database_id::UserId, user::User};

/// A user as it appears in response bodies.
///
/// The password hash is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub currency: Currency,
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            name: user.name,
            currency: user.currency,
            created_at: user.created_at,
        }
    }
}
