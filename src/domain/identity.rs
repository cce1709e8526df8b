//! Requester identity
//!
//! Resolved from a token by the auth layer and passed explicitly into the
//! allocation engine; there is no ambient/session fallback identity.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user ID (subject claim)
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Contact phone, also used as the booking-history key
    pub phone: String,
    /// Guest identities are subject to the daily booking quota
    pub is_guest: bool,
}

impl Identity {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        is_guest: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            phone: phone.into(),
            is_guest,
        }
    }
}
