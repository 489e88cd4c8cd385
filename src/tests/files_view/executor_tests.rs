use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;

use anyhow::Result;

use super::*;
use crate::access::Capabilities;
use crate::files_view::ViewIdentity;
use crate::model::{
    BranchComparison, CommitRef, DivergenceSummary, FileEntry, FileKind, ProjectInfo,
    ProjectLocation,
};

#[derive(Default)]
struct FakeBackend {
    fail_listing: bool,
    calls: Mutex<Vec<String>>,
}

impl FilesBackend for FakeBackend {
    fn get_listing(
        &self,
        project_id: u64,
        path: &str,
        include_subtree: bool,
        branch: &str,
    ) -> Result<Vec<FileEntry>> {
        self.calls.lock().unwrap().push(format!(
            "listing {} {:?} {} {}",
            project_id, path, include_subtree, branch
        ));
        if self.fail_listing {
            anyhow::bail!("listing unavailable");
        }
        Ok(vec![FileEntry {
            id: "1".to_string(),
            name: "lib.rs".to_string(),
            path: format!("{}/lib.rs", path),
            kind: FileKind::Blob,
        }])
    }

    fn compare_branches(&self, project_id: u64, base: &str, head: &str) -> Result<BranchComparison> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("compare {} {} {}", project_id, base, head));
        let c = |id: &str| CommitRef {
            id: id.to_string(),
            message: None,
            authored_at: None,
        };
        Ok(BranchComparison {
            ahead: vec![c("a1"), c("a2"), c("a3")],
            behind: vec![],
        })
    }

    fn get_project(&self, _project_id: u64) -> Result<ProjectInfo> {
        anyhow::bail!("not used")
    }
}

fn view() -> FilesView {
    FilesView::new(ProjectLocation::new("acme", "widgets"), Capabilities::default())
}

#[test]
fn runs_listing_and_comparison_to_completion() {
    let backend = Arc::new(FakeBackend::default());
    let executor = LoadExecutor::new(backend.clone());
    let mut v = view();

    let requests = v.set_identity(ViewIdentity::new(3, "src", Some("feature".to_string()), "main"));
    run_to_completion(&mut v, &executor, requests);

    assert!(!v.busy());
    assert_eq!(v.entries().len(), 1);
    assert_eq!(v.entries()[0].entry.path, "src/lib.rs");
    assert_eq!(v.divergence(), DivergenceSummary { ahead: 3, behind: 0 });

    let mut calls = backend.calls.lock().unwrap().clone();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "compare 3 main feature".to_string(),
            "listing 3 \"src\" false feature".to_string(),
        ]
    );
}

#[test]
fn comparison_still_applies_when_listing_fails() {
    let backend = Arc::new(FakeBackend {
        fail_listing: true,
        ..FakeBackend::default()
    });
    let executor = LoadExecutor::new(backend);
    let mut v = view();

    let requests = v.set_identity(ViewIdentity::new(3, "", Some("feature".to_string()), "main"));
    run_to_completion(&mut v, &executor, requests);

    assert!(!v.busy());
    assert!(v.entries().is_empty());
    assert_eq!(v.divergence().ahead, 3);
    assert_eq!(v.notices().len(), 1);
}

#[test]
fn pump_applies_only_current_generation() {
    let backend = Arc::new(FakeBackend::default());
    let executor = LoadExecutor::new(backend);
    let mut v = view();

    let stale = v.set_identity(ViewIdentity::new(3, "old", None, "main"));
    let current = v.set_identity(ViewIdentity::new(3, "new", None, "main"));
    executor.spawn(stale);
    executor.spawn(current);

    let mut applied = 0;
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while applied == 0 && std::time::Instant::now() < deadline {
        applied += executor.pump(&mut v);
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(applied, 1);
    assert_eq!(v.entries()[0].entry.path, "new/lib.rs");
}

#[derive(Default)]
struct SlowBackend {
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<mpsc::Receiver<()>>>,
}

impl FilesBackend for SlowBackend {
    fn get_listing(
        &self,
        _project_id: u64,
        path: &str,
        _include_subtree: bool,
        _branch: &str,
    ) -> Result<Vec<FileEntry>> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if path == "block" {
            if let Some(gate) = self.gate.lock().unwrap().take() {
                let _ = gate.recv_timeout(Duration::from_secs(5));
            }
        } else {
            thread::sleep(Duration::from_millis(20));
        }
        self.calls.lock().unwrap().push(path.to_string());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    fn compare_branches(&self, _project_id: u64, _base: &str, _head: &str) -> Result<BranchComparison> {
        Ok(BranchComparison::default())
    }

    fn get_project(&self, _project_id: u64) -> Result<ProjectInfo> {
        anyhow::bail!("not used")
    }
}

fn listing(generation: u64, path: &str) -> LoadRequest {
    LoadRequest::Listing {
        generation,
        project_id: 3,
        path: path.to_string(),
        include_subtree: false,
        branch: "main".to_string(),
    }
}

#[test]
fn fixed_pool_drains_more_requests_than_workers() {
    let backend = Arc::new(SlowBackend::default());
    let executor = LoadExecutor::with_workers(backend.clone(), 2);
    assert_eq!(executor.workers(), 2);

    let mut v = view();
    let first = v.set_identity(ViewIdentity::new(3, "src", None, "main"));
    let generation = first[0].generation();

    let requests: Vec<LoadRequest> = (0..10)
        .map(|i| listing(generation, &format!("dir{}", i)))
        .collect();
    run_to_completion(&mut v, &executor, requests);

    assert_eq!(backend.calls.lock().unwrap().len(), 10);
    assert!(backend.peak.load(Ordering::SeqCst) <= 2);
    assert!(!v.busy());
}

#[test]
fn queued_loads_from_older_generations_are_skipped() {
    let (release, gate) = mpsc::channel();
    let backend = Arc::new(SlowBackend {
        gate: Mutex::new(Some(gate)),
        ..SlowBackend::default()
    });
    let executor = LoadExecutor::with_workers(backend.clone(), 1);

    executor.spawn(vec![listing(1, "block"), listing(1, "stale-a"), listing(1, "stale-b")]);
    executor.spawn(vec![listing(2, "fresh")]);
    release.send(()).unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    let mut fresh_done = false;
    while !fresh_done && std::time::Instant::now() < deadline {
        if let Some(completion) = executor.next_timeout(Duration::from_millis(50)) {
            fresh_done = completion.generation() == 2;
        }
    }
    assert!(fresh_done);

    let calls = backend.calls.lock().unwrap().clone();
    assert!(!calls.iter().any(|c| c.starts_with("stale")));
    assert_eq!(calls.last().map(String::as_str), Some("fresh"));
}

#[test]
fn default_worker_count_is_bounded() {
    let n = default_worker_threads();
    assert!((1..=8).contains(&n));
}
