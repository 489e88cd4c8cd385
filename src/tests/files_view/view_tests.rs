use super::*;
use crate::model::{CommitRef, FileKind};
use crate::remote::RemoteStatusError;

fn view() -> FilesView {
    FilesView::new(ProjectLocation::new("acme", "widgets"), Capabilities::default())
}

fn identity(branch: Option<&str>) -> ViewIdentity {
    ViewIdentity::new(7, "", branch.map(str::to_string), "main")
}

fn entry(id: &str, name: &str, kind: FileKind) -> FileEntry {
    FileEntry {
        id: id.to_string(),
        name: name.to_string(),
        path: name.to_string(),
        kind,
    }
}

fn commits(n: usize) -> Vec<CommitRef> {
    (0..n)
        .map(|i| CommitRef {
            id: format!("c{}", i),
            message: None,
            authored_at: None,
        })
        .collect()
}

fn listing(generation: u64, entries: Vec<FileEntry>) -> LoadCompletion {
    LoadCompletion::Listing {
        generation,
        result: Ok(entries),
    }
}

fn comparison(generation: u64, ahead: usize, behind: usize) -> LoadCompletion {
    LoadCompletion::Compare {
        generation,
        result: Ok(BranchComparison {
            ahead: commits(ahead),
            behind: commits(behind),
        }),
    }
}

#[test]
fn default_branch_requests_only_the_listing() {
    let mut v = view();
    let requests = v.set_identity(identity(None));

    assert_eq!(
        requests,
        vec![LoadRequest::Listing {
            generation: 1,
            project_id: 7,
            path: String::new(),
            include_subtree: false,
            branch: "main".to_string(),
        }]
    );
    assert!(v.busy());
    assert_eq!(v.divergence(), DivergenceSummary::default());
    assert!(v.banner().is_none());
}

#[test]
fn null_branch_behaves_like_default_branch() {
    let mut v = view();
    let requests = v.set_identity(identity(Some("null")));
    assert_eq!(requests.len(), 1);
    assert!(matches!(requests[0], LoadRequest::Listing { ref branch, .. } if branch == "main"));
}

#[test]
fn other_branch_also_requests_comparison_against_default() {
    let mut v = view();
    let requests = v.set_identity(identity(Some("feature")));

    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1],
        LoadRequest::Compare {
            generation: 1,
            project_id: 7,
            base: "main".to_string(),
            head: "feature".to_string(),
        }
    );
}

#[test]
fn without_project_nothing_is_requested() {
    let mut v = view();
    let requests = v.set_identity(ViewIdentity {
        project_id: None,
        path: String::new(),
        requested_branch: Some("feature".to_string()),
        default_branch: "main".to_string(),
    });
    assert!(requests.is_empty());
    assert!(!v.busy());
}

#[test]
fn successful_loads_replace_entries_and_counts() {
    let mut v = view();
    v.set_identity(identity(Some("feature")));

    assert!(v.apply(listing(1, vec![entry("1", "src", FileKind::Tree)])));
    assert!(v.apply(comparison(1, 2, 1)));

    assert!(!v.busy());
    assert_eq!(v.entries().len(), 1);
    assert_eq!(v.entries()[0].key.as_str(), "1 src");
    assert_eq!(v.divergence(), DivergenceSummary { ahead: 2, behind: 1 });
    assert!(v.notices().is_empty());
}

#[test]
fn listing_failure_keeps_previous_entries_and_clears_busy() {
    let mut v = view();
    v.set_identity(identity(None));
    v.apply(listing(1, vec![entry("1", "README.md", FileKind::Blob)]));

    v.reload();
    assert!(v.busy());
    assert!(v.apply(LoadCompletion::Listing {
        generation: 2,
        result: Err(anyhow::anyhow!("connection reset")),
    }));

    assert!(!v.busy());
    assert_eq!(v.entries().len(), 1);
    assert_eq!(v.entries()[0].entry.name, "README.md");
    let notices = v.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::ListingFetchFailure);
    assert_eq!(notices[0].title, NOTICE_TITLE);
    assert_eq!(notices[0].message, LISTING_FAILED);
    assert!(v.notices().is_empty());
}

#[test]
fn first_listing_failure_leaves_listing_empty() {
    let mut v = view();
    v.set_identity(identity(None));
    v.apply(LoadCompletion::Listing {
        generation: 1,
        result: Err(anyhow::anyhow!("boom")),
    });
    assert!(!v.busy());
    assert!(v.entries().is_empty());
    assert_eq!(v.notices().len(), 1);
}

#[test]
fn comparison_failure_surfaces_backend_message_and_keeps_counts() {
    let mut v = view();
    v.set_identity(identity(Some("feature")));
    v.apply(comparison(1, 3, 0));

    v.reload();
    let err = anyhow::Error::from(RemoteStatusError {
        status: 404,
        message: "branch not found: feature".to_string(),
    })
    .context("compare branches");
    v.apply(LoadCompletion::Compare {
        generation: 2,
        result: Err(err),
    });

    assert_eq!(v.divergence(), DivergenceSummary { ahead: 3, behind: 0 });
    assert_eq!(v.notices().len(), 1);
    assert_eq!(v.notices()[0].kind, NoticeKind::ComparisonFetchFailure);
    assert_eq!(v.notices()[0].message, "branch not found: feature");
}

#[test]
fn comparison_failure_without_message_uses_fallback() {
    let mut v = view();
    v.set_identity(identity(Some("feature")));
    v.apply(LoadCompletion::Compare {
        generation: 1,
        result: Err(anyhow::anyhow!("")),
    });
    assert_eq!(v.notices()[0].message, COMPARISON_FAILED);
    assert_eq!(v.divergence(), DivergenceSummary::default());
}

#[test]
fn one_failed_load_does_not_affect_the_other() {
    let mut v = view();
    v.set_identity(identity(Some("feature")));
    v.apply(LoadCompletion::Listing {
        generation: 1,
        result: Err(anyhow::anyhow!("listing down")),
    });
    v.apply(comparison(1, 1, 4));

    assert!(!v.busy());
    assert_eq!(v.divergence(), DivergenceSummary { ahead: 1, behind: 4 });
    assert_eq!(v.notices().len(), 1);
}

#[test]
fn stale_completions_are_discarded() {
    let mut v = view();
    v.set_identity(identity(Some("feature")));
    v.set_identity(identity(Some("other")));
    assert_eq!(v.generation(), 2);

    assert!(!v.apply(listing(1, vec![entry("1", "stale.txt", FileKind::Blob)])));
    assert!(!v.apply(comparison(1, 9, 9)));
    assert!(v.busy());
    assert!(v.entries().is_empty());
    assert_eq!(v.divergence(), DivergenceSummary::default());

    assert!(v.apply(listing(2, vec![entry("2", "fresh.txt", FileKind::Blob)])));
    assert!(!v.busy());
    assert_eq!(v.entries()[0].entry.name, "fresh.txt");
}

#[test]
fn unchanged_identity_does_not_trigger_again() {
    let mut v = view();
    assert_eq!(v.set_identity(identity(Some("feature"))).len(), 2);
    assert!(v.set_identity(identity(Some("feature"))).is_empty());
    assert_eq!(v.generation(), 1);
}

#[test]
fn null_and_missing_branch_share_a_load_key() {
    let mut v = view();
    v.set_identity(identity(None));
    assert!(v.set_identity(identity(Some("null"))).is_empty());
}

#[test]
fn repeated_identical_loads_do_not_accumulate() {
    let mut v = view();
    let files = vec![
        entry("1", "src", FileKind::Tree),
        entry("2", "Cargo.toml", FileKind::Blob),
    ];

    v.set_identity(identity(Some("feature")));
    v.apply(listing(1, files.clone()));
    v.apply(comparison(1, 2, 1));
    let first_entries = v.entries().to_vec();

    v.reload();
    v.apply(listing(2, files));
    v.apply(comparison(2, 2, 1));

    assert_eq!(v.entries(), first_entries.as_slice());
    assert_eq!(v.divergence(), DivergenceSummary { ahead: 2, behind: 1 });
}

#[test]
fn returning_to_default_branch_clears_divergence() {
    let mut v = view();
    v.set_identity(identity(Some("feature")));
    v.apply(comparison(1, 2, 1));
    assert!(v.divergence().has_changes());

    let requests = v.set_identity(identity(None));
    assert_eq!(requests.len(), 1);
    assert_eq!(v.divergence(), DivergenceSummary::default());
    assert!(v.banner().is_none());
}

#[test]
fn listing_order_is_kept_as_returned() {
    let mut v = view();
    v.set_identity(identity(None));
    v.apply(listing(
        1,
        vec![
            entry("3", "zeta", FileKind::Blob),
            entry("1", "alpha", FileKind::Tree),
        ],
    ));
    let names: Vec<_> = v.entries().iter().map(|e| e.entry.name.as_str()).collect();
    assert_eq!(names, ["zeta", "alpha"]);
}
