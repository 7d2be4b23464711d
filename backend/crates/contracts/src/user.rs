//! User contracts shared by the API and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::shape::{FieldShape, ObjectShape, Shaped};

/// Stored user as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: Uuid,
    /// Login email address.
    pub email: String,
    /// Display name, if set.
    pub name: Option<String>,
    /// Avatar image URL, if set.
    pub avatar_url: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

impl Shaped for User {
    fn shape() -> ObjectShape {
        ObjectShape::new()
            .field("id", FieldShape::string().uuid())
            .field("email", FieldShape::string().email())
            .field("name", FieldShape::string().nullable())
            .field("avatarUrl", FieldShape::string().url().nullable())
            .field("isActive", FieldShape::boolean())
            .field("createdAt", FieldShape::date().coerce())
            .field("updatedAt", FieldShape::date().coerce())
    }
}

/// Payload accepted when creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    /// Login email address.
    pub email: String,
    /// Display name, if any.
    pub name: Option<String>,
    /// Avatar image URL, if any.
    pub avatar_url: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
}

impl Shaped for CreateUser {
    fn shape() -> ObjectShape {
        User::shape().omit(&["id", "createdAt", "updatedAt"])
    }
}

/// Partial update of a user.
///
/// For nullable fields the outer `Option` records presence and the inner one
/// records an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New display name, or `Some(None)` to clear it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,
    /// New avatar URL, or `Some(None)` to clear it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<Option<String>>,
    /// New activation flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Shaped for UpdateUser {
    fn shape() -> ObjectShape {
        CreateUser::shape().partial()
    }
}

#[cfg(test)]
mod tests {
    //! User contract validation.

    use super::*;
    use crate::shape::IssueCode;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn user_parses_and_coerces_dates() {
        let user = User::parse(&json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "email": "ada@example.com",
            "name": null,
            "avatarUrl": "https://example.com/ada.png",
            "isActive": true,
            "createdAt": "2024-01-01",
            "updatedAt": 1_704_067_200_000_i64
        }))
        .expect("valid user");

        assert_eq!(user.name, None);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[rstest]
    fn create_user_ignores_server_managed_fields() {
        let created = CreateUser::parse(&json!({
            "id": "not-a-uuid",
            "email": "ada@example.com",
            "name": "Ada",
            "avatarUrl": null,
            "isActive": false
        }))
        .expect("id is not part of the create shape");
        assert_eq!(created.name.as_deref(), Some("Ada"));
    }

    #[rstest]
    fn create_user_reports_each_bad_field() {
        let failure = CreateUser::parse(&json!({
            "email": "ada",
            "avatarUrl": "not a url",
            "isActive": "yes"
        }))
        .expect_err("invalid payload");
        let codes: Vec<IssueCode> = failure.issues.iter().map(|issue| issue.code).collect();
        assert_eq!(
            codes,
            vec![
                IssueCode::InvalidString,
                IssueCode::Required,
                IssueCode::InvalidString,
                IssueCode::InvalidType,
            ]
        );
    }

    #[rstest]
    fn update_user_distinguishes_null_from_absent() {
        let update = UpdateUser::parse(&json!({ "name": null })).expect("valid update");
        assert_eq!(update.name, Some(None));
        assert_eq!(update.avatar_url, None);
        assert_eq!(update.email, None);
    }
}
