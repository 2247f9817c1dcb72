use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The role and permission bearing view of the principal behind a request.
pub trait PermissionHolder: Send + Sync {
    /// Identifies the principal in logs.
    fn identifier(&self) -> &str;

    fn roles(&self) -> Vec<String>;

    fn permissions(&self) -> Vec<String>;

    fn has_role(&self, name: &str) -> bool {
        self.roles().iter().any(|role| role == name)
    }
}

/// A plain principal with a fixed set of roles and permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,

    #[serde(default)]
    pub roles: HashSet<String>,

    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Subject {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.roles.extend(roles.into_iter().map(|r| r.to_string()));
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.permissions
            .extend(permissions.into_iter().map(|p| p.to_string()));
        self
    }
}

impl PermissionHolder for Subject {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn roles(&self) -> Vec<String> {
        self.roles.iter().cloned().collect()
    }

    fn permissions(&self) -> Vec<String> {
        self.permissions.clone()
    }

    fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }
}
