//! Acting-user context passed explicitly into write operations.

use serde::{Deserialize, Serialize};

/// Portal role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

/// Identity of whoever submits a form.
///
/// Author-like record fields (`organizer`, `reported_by`, `seller`, ...) are
/// filled from `display_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Context used for demo seeding and other system-originated writes.
    pub fn system() -> Self {
        Self::new("system", "Campus Portal", Role::Admin)
    }
}
