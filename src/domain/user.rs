//! User accounts and the acting principal

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "STUDENT")]
    Student,
    #[sea_orm(string_value = "TEACHER")]
    Teacher,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Teacher => "TEACHER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "TEACHER" => Ok(Self::Teacher),
            "ADMIN" => Ok(Self::Admin),
            other => Err(DomainError::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// The authenticated principal a service call runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn can_teach(&self) -> bool {
        matches!(self.role, UserRole::Teacher | UserRole::Admin)
    }

    /// Owner of a resource, or an admin.
    pub fn owns(&self, owner_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_id
    }

    pub fn ensure_owns(&self, owner_id: &str, what: &str) -> DomainResult<()> {
        if self.owns(owner_id) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!("You do not own this {}", what)))
        }
    }

    pub fn ensure_teacher(&self) -> DomainResult<()> {
        if self.can_teach() {
            Ok(())
        } else {
            Err(DomainError::forbidden("Teacher role required"))
        }
    }

    pub fn ensure_admin(&self) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::forbidden("Admin role required"))
        }
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_owns_everything() {
        let admin = Actor::new("a", UserRole::Admin);
        assert!(admin.owns("someone-else"));
        assert!(admin.ensure_teacher().is_ok());
    }

    #[test]
    fn student_cannot_teach() {
        let s = Actor::new("s", UserRole::Student);
        assert!(s.owns("s"));
        assert!(!s.owns("t"));
        assert!(matches!(s.ensure_teacher(), Err(DomainError::Forbidden(_))));
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("teacher".parse::<UserRole>().unwrap(), UserRole::Teacher);
        assert!("guest".parse::<UserRole>().is_err());
    }
}
