use crate::api::handlers::User;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Application state shared across handlers
#[derive(Debug, Default)]
pub struct AppState {
    users: RwLock<BTreeMap<String, User>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    pub fn list_users(&self) -> Vec<User> {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn get_user(&self, id: &str) -> Option<User> {
        self.users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn create_user(&self, name: String, email: Option<String>) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            created_at: Utc::now(),
        };
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id.clone(), user.clone());
        user
    }

    pub fn delete_user(&self, id: &str) -> Option<User> {
        self.users.write().unwrap_or_else(|e| e.into_inner()).remove(id)
    }
}
