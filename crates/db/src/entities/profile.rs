//! User profile entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report::Department;

/// Role of an account holder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "investigator")]
    Investigator,
    #[sea_orm(string_value = "user")]
    #[default]
    User,
}

impl UserRole {
    /// Stored string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Investigator => "investigator",
            Self::User => "user",
        }
    }

    /// Whether this role belongs to staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        !matches!(self, Self::User)
    }
}

/// Account profile.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Lowercased email address.
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    /// 8-digit id shown to the user at sign-up.
    #[sea_orm(unique)]
    pub display_user_id: String,
    /// Department a moderator or investigator is responsible for.
    pub department: Option<Department>,
    /// Current session bearer token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
