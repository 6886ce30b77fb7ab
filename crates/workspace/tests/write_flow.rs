use async_trait::async_trait;
use codeprep_text::extract_blocks;
use codeprep_workspace::{
    prepare_writes, write_all, DocumentHost, NoopHost, RetryPolicy, WorkspaceError,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct FailingHost {
    calls: AtomicU32,
}

#[async_trait]
impl DocumentHost for FailingHost {
    async fn format_and_save(&self, path: &Path) -> codeprep_workspace::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(WorkspaceError::host(path, "formatter crashed"))
    }
}

fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(1))
}

#[tokio::test]
async fn reply_is_written_back_to_disk() {
    let temp = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(temp.path().join("src")).expect("create src");
    std::fs::write(temp.path().join("src/a.js"), "old\n").expect("seed");

    let reply = "--- src/a.js ---\n```js\nconsole.log(\"hi\");\n```\n\n\
                 --- src/new/b.js ---\n```js\nexport {};\n```\n";
    let extraction = extract_blocks(reply);
    let prepared = prepare_writes(&extraction.blocks, Some(temp.path())).expect("prepare");
    let report = write_all(prepared, Arc::new(NoopHost), fast_retry(1)).await;

    assert!(report.is_complete_success());
    let created: Vec<bool> = report.outcomes.iter().map(|o| o.created()).collect();
    assert_eq!(created, vec![false, true]);
    assert_eq!(
        std::fs::read_to_string(temp.path().join("src/a.js")).expect("read a"),
        "console.log(\"hi\");\n"
    );
    assert_eq!(
        std::fs::read_to_string(temp.path().join("src/new/b.js")).expect("read b"),
        "export {};\n"
    );
}

#[tokio::test]
async fn one_bad_target_does_not_stop_its_siblings() {
    let temp = TempDir::new().expect("tempdir");
    // A regular file where a directory is needed makes that target unwritable.
    std::fs::write(temp.path().join("blocker"), "").expect("seed blocker");

    let reply = "```rust\n// ok/one.rs\nfn one() {}\n```\n\
                 ```rust\n// blocker/two.rs\nfn two() {}\n```\n\
                 ```rust\n// ok/three.rs\nfn three() {}\n```\n";
    let extraction = extract_blocks(reply);
    let prepared = prepare_writes(&extraction.blocks, Some(temp.path())).expect("prepare");
    let report = write_all(prepared, Arc::new(NoopHost), fast_retry(2)).await;

    let ok: Vec<&str> = report
        .succeeded()
        .iter()
        .map(|o| o.display_path.as_str())
        .collect();
    assert_eq!(ok, vec!["ok/one.rs", "ok/three.rs"]);

    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].display_path, "blocker/two.rs");
    assert!(matches!(
        report.first_error(),
        Some(WorkspaceError::RetryExhausted { attempts: 2, .. })
    ));
    assert!(temp.path().join("ok/three.rs").exists());
}

#[tokio::test]
async fn host_failures_exhaust_the_retry_budget() {
    let temp = TempDir::new().expect("tempdir");
    let extraction = extract_blocks("```\n// a.txt\nhello\n```");
    let prepared = prepare_writes(&extraction.blocks, Some(temp.path())).expect("prepare");

    let host = Arc::new(FailingHost {
        calls: AtomicU32::new(0),
    });
    let report = write_all(prepared, host.clone(), fast_retry(3)).await;

    assert_eq!(host.calls.load(Ordering::SeqCst), 3);
    let err = report.first_error().expect("write should fail");
    assert!(err.to_string().contains("a.txt"), "{err}");
    // The content still landed before the formatter gave up.
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.txt")).expect("read"),
        "hello\n"
    );
}

#[test]
fn fallback_reply_without_a_path_is_ambiguous() {
    let extraction = extract_blocks("just some code\nwithout a marker");
    assert!(extraction.is_ambiguous());
    assert!(matches!(
        prepare_writes(&extraction.blocks, Some(Path::new("/tmp"))),
        Err(WorkspaceError::AmbiguousPath)
    ));
}
