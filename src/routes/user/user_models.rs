use serde::Deserialize;

use crate::models::user::User;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl CreateUserRequest {
    pub fn into_user(self) -> Option<User> {
        let blank = [&self.username, &self.email, &self.first_name, &self.last_name]
            .iter()
            .any(|field| field.is_empty());
        if blank {
            return None;
        }
        Some(User::new(self.username, self.email, self.first_name, self.last_name))
    }
}
