use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistStatus {
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    #[sea_orm(string_value = "NOTIFIED")]
    Notified,
    #[sea_orm(string_value = "ENROLLED")]
    Enrolled,
    #[sea_orm(string_value = "LEFT")]
    Left,
}

impl WaitlistStatus {
    /// Still holding a place in the queue.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Waiting | Self::Notified)
    }
}

impl std::fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Waiting => "WAITING",
            Self::Notified => "NOTIFIED",
            Self::Enrolled => "ENROLLED",
            Self::Left => "LEFT",
        })
    }
}
