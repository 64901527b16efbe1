use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_not_blank;

/// User entity representing a registered user in the system
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub user_id: i64,
    pub name: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
        }
    }
}

/// Request payload for user creation
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Jo Garcia",
    "password": "securepassword123"
}))]
pub struct CreateUserRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Response returned after a user is created
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedUser {
    pub user_id: i64,
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_create_user_request_validation() {
        assert!(request("Joe", "password123").validate().is_ok());
        assert!(request("   ", "password123").validate().is_err());
        assert!(request("Joe", "short").validate().is_err());
        assert!(request(&"x".repeat(101), "password123").validate().is_err());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            user_id: 1,
            name: "Joe".to_string(),
            password_hash: "$2b$12$hash".to_string(),
        };

        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(
            serde_json::to_value(UserSummary::from(user)).unwrap(),
            serde_json::json!({ "user_id": 1, "name": "Joe" })
        );
    }
}
