use std::fmt;

use serde::{Deserialize, Serialize};

/// Named permission group assigned to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Reader,
    Editor,
    Admin,
}

impl Role {
    /// Every role the system knows about, in seeding order.
    pub const ALL: [Role; 3] = [Role::Reader, Role::Editor, Role::Admin];

    /// Role granted to every newly registered account.
    pub const DEFAULT: Role = Role::Reader;

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "Reader",
            Role::Editor => "Editor",
            Role::Admin => "Admin",
        }
    }

    /// Parse a stored role name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
