use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authored_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchComparison {
    #[serde(default)]
    pub ahead: Vec<CommitRef>,
    #[serde(default)]
    pub behind: Vec<CommitRef>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceSummary {
    pub ahead: usize,
    pub behind: usize,
}

impl DivergenceSummary {
    pub fn from_comparison(cmp: &BranchComparison) -> Self {
        Self {
            ahead: cmp.ahead.len(),
            behind: cmp.behind.len(),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.ahead > 0 || self.behind > 0
    }
}
