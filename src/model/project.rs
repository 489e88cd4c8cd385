use serde::{Deserialize, Serialize};

use crate::access::AccessLevel;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: u64,
    pub namespace: String,
    pub slug: String,
    pub default_branch: String,

    /// Role of the caller on this project.
    #[serde(default)]
    pub access_level: AccessLevel,
}

impl ProjectInfo {
    pub fn location(&self) -> ProjectLocation {
        ProjectLocation {
            namespace: self.namespace.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Route prefix (`/{namespace}/{slug}`) for every generated link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLocation {
    pub namespace: String,
    pub slug: String,
}

impl ProjectLocation {
    pub fn new(namespace: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            slug: slug.into(),
        }
    }
}
