mod auth;
mod store;

pub use auth::{generate_secret, token_digest, ApplicationPassword, TokenDigest};
pub use store::{InMemoryUserStore, UserRecord, UserStore};

use serde::{Deserialize, Serialize};

/// Capabilities a principal can hold, mirroring the host CMS's role model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Read,
    EditPosts,
    ManageOptions,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::EditPosts => "edit_posts",
            Capability::ManageOptions => "manage_options",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Capability::Read),
            "edit_posts" => Some(Capability::EditPosts),
            "manage_options" => Some(Capability::ManageOptions),
            _ => None,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity a request runs as.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: u64,
    pub login: String,
    pub capabilities: Vec<Capability>,
}

impl Principal {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
