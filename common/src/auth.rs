use serde::{Deserialize, Serialize};

/// The identity a store call acts for.
///
/// Every persistence operation takes an `AuthContext` explicitly; there is
/// no ambient session. Stored records are scoped to and stamped with this
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
}

impl AuthContext {
    /// Creates a new [`AuthContext`] for the given user.
    pub fn new(user_id: &str) -> Self {
        AuthContext {
            user_id: user_id.to_owned(),
        }
    }
}
