pub mod assistant;
pub mod auth;
pub mod keyring;

use serde::{Deserialize, Serialize};

/// An authenticated session against the hosted identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub organization_id: String,
    pub token: String,
}
