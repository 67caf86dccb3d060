use crate::{Role, UserId};
use serde::{Deserialize, Serialize};

/// The identity a permission session is opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub display_name: String,
    pub role: Role,
}

impl UserAccount {
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            role,
        }
    }
}
