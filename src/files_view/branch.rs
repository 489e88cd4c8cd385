/// Placeholder some callers pass when no branch was selected.
pub const NULL_BRANCH: &str = "null";

/// The branch to query: the requested one unless it is missing, empty or the
/// literal `"null"`, in which case the default branch.
pub fn resolve_branch(requested: Option<&str>, default_branch: &str) -> String {
    match requested {
        Some(b) if !b.is_empty() && b != NULL_BRANCH => b.to_string(),
        _ => default_branch.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/files_view/branch_tests.rs"]
mod tests;
