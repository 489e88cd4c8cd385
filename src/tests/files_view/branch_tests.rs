use super::*;

#[test]
fn missing_empty_or_null_fall_back_to_default() {
    for requested in [None, Some(""), Some("null")] {
        assert_eq!(resolve_branch(requested, "main"), "main", "{:?}", requested);
    }
}

#[test]
fn any_other_branch_is_used_as_is() {
    assert_eq!(resolve_branch(Some("feature"), "main"), "feature");
    assert_eq!(resolve_branch(Some("main"), "main"), "main");
    assert_eq!(resolve_branch(Some("Null"), "main"), "Null");
    assert_eq!(resolve_branch(Some("release/1.0"), "main"), "release/1.0");
}
