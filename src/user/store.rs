use super::auth::ApplicationPassword;
use super::{Capability, Principal};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: u64,
    pub login: String,
    pub display_name: String,
    pub capabilities: Vec<Capability>,
    pub passwords: Vec<ApplicationPassword>,
}

impl UserRecord {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            login: self.login.clone(),
            capabilities: self.capabilities.clone(),
        }
    }
}

/// User lookup seam. `validate_builtin` is the hook for the host CMS's own
/// password check, consulted when no stored application password matches.
pub trait UserStore: Send + Sync {
    fn find_user(&self, login: &str) -> Option<UserRecord>;

    fn all_users(&self) -> Vec<UserRecord>;

    fn validate_builtin(&self, login: &str, password: &str) -> bool;
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Vec<UserRecord>,
    builtin_passwords: HashMap<String, ApplicationPassword>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, login: &str, capabilities: Vec<Capability>) -> u64 {
        let id = self.users.len() as u64 + 1;
        self.users.push(UserRecord {
            id,
            login: login.to_string(),
            display_name: login.to_string(),
            capabilities,
            passwords: Vec::new(),
        });
        id
    }

    pub fn add_application_password(&mut self, login: &str, name: &str, secret: &str) -> Result<()> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.login == login)
            .ok_or_else(|| anyhow!("unknown user: {}", login))?;
        user.passwords.push(ApplicationPassword::new(name, secret)?);
        Ok(())
    }

    /// Register a login password checked only through `validate_builtin`.
    pub fn set_builtin_password(&mut self, login: &str, password: &str) -> Result<()> {
        self.builtin_passwords
            .insert(login.to_string(), ApplicationPassword::new("builtin", password)?);
        Ok(())
    }
}

impl UserStore for InMemoryUserStore {
    fn find_user(&self, login: &str) -> Option<UserRecord> {
        self.users.iter().find(|u| u.login == login).cloned()
    }

    fn all_users(&self) -> Vec<UserRecord> {
        self.users.clone()
    }

    fn validate_builtin(&self, login: &str, password: &str) -> bool {
        self.builtin_passwords
            .get(login)
            .map(|stored| stored.verify(password))
            .unwrap_or(false)
    }
}
