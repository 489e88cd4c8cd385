//! Project roles and the capabilities derived from them.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Visitor,
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
}

impl AccessLevel {
    pub fn value(self) -> u32 {
        match self {
            AccessLevel::Visitor => 0,
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
        }
    }

    pub fn at_least(self, min: AccessLevel) -> bool {
        self.value() >= min.value()
    }

    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::Visitor => "visitor",
            AccessLevel::Guest => "guest",
            AccessLevel::Reporter => "reporter",
            AccessLevel::Developer => "developer",
            AccessLevel::Maintainer => "maintainer",
            AccessLevel::Owner => "owner",
        }
    }
}

/// What the current viewer may do from the files view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub can_create_merge_request: bool,
}

impl Capabilities {
    pub const MERGE_REQUEST_MIN_ROLE: AccessLevel = AccessLevel::Developer;

    pub fn for_level(level: AccessLevel) -> Self {
        Self {
            can_create_merge_request: level.at_least(Self::MERGE_REQUEST_MIN_ROLE),
        }
    }
}

#[cfg(test)]
#[path = "tests/access_tests.rs"]
mod tests;
