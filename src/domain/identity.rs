use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The authenticated identity on whose behalf an operation runs.
///
/// Supplied by the identity provider at the boundary and passed explicitly
/// into every workflow call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub is_staff: bool,
}

impl Actor {
    pub fn new(id: Uuid, role: Role, is_staff: bool) -> Self {
        Self { id, role, is_staff }
    }

    pub fn buyer(id: Uuid) -> Self {
        Self::new(id, Role::Buyer, false)
    }

    pub fn seller(id: Uuid) -> Self {
        Self::new(id, Role::Seller, false)
    }

    pub fn staff(id: Uuid) -> Self {
        Self::new(id, Role::Admin, true)
    }

    pub fn is(&self, user_id: Uuid) -> bool {
        self.id == user_id
    }
}
