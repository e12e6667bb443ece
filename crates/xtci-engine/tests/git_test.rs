use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use mockall::mock;
use tempfile::TempDir;
use xtci_engine::command::CommandError;
use xtci_engine::executor::{GitExecutor, RealGitExecutor};
use xtci_engine::git::{Cleanliness, CommitError, CommitOutcome, DirtyReason, GitClient};

mock! {
    Executor {}

    impl GitExecutor for Executor {
        async fn exec(&self, dir: &Path, args: &[String]) -> Result<String, CommandError>;
    }
}

type Calls = Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>;

fn exit_1(args: &[String]) -> CommandError {
    CommandError::CommandFailed {
        program: "git",
        args: args.to_vec(),
        output: "(exit status: 1)".to_owned(),
    }
}

/// Mock whose responses are decided by `respond`; every call is recorded.
fn git_mock<F>(respond: F) -> (MockExecutor, Calls)
where
    F: Fn(&[String]) -> Result<String, CommandError> + Send + 'static,
{
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(move |dir, args| {
        recorded
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), args.to_vec()));
        respond(args)
    });
    (mock, calls)
}

fn fails_on(subcommand: &'static str) -> impl Fn(&[String]) -> Result<String, CommandError> {
    move |args| {
        if args[0] == subcommand {
            Err(exit_1(args))
        } else {
            Ok(String::new())
        }
    }
}

fn commit_calls(calls: &Calls) -> Vec<Vec<String>> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, args)| args[0] == "commit")
        .map(|(_, args)| args.clone())
        .collect()
}

// ── Dirtiness (mocked) ──

#[tokio::test]
async fn clean_when_all_checks_pass() {
    let (mock, calls) = git_mock(|_| Ok(String::new()));
    let client = GitClient::with_executor(mock);

    assert_eq!(client.cleanliness(Path::new("/m")).await, Cleanliness::Clean);

    let calls = calls.lock().unwrap();
    let sequence: Vec<Vec<String>> = calls.iter().map(|(_, a)| a.clone()).collect();
    assert_eq!(
        sequence,
        vec![
            vec!["symbolic-ref", "HEAD"],
            vec!["diff-index", "--quiet", "--cached", "HEAD"],
            vec!["diff-files", "--quiet"],
        ]
    );
    assert!(calls.iter().all(|(dir, _)| dir == Path::new("/m")));
}

#[tokio::test]
async fn detached_head_is_dirty_and_stops_checking() {
    let (mock, calls) = git_mock(fails_on("symbolic-ref"));
    let client = GitClient::with_executor(mock);

    assert_eq!(
        client.cleanliness(Path::new("/m")).await,
        Cleanliness::Dirty(DirtyReason::DetachedHead)
    );
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn staged_changes_are_dirty() {
    let (mock, _) = git_mock(fails_on("diff-index"));
    let client = GitClient::with_executor(mock);

    assert_eq!(
        client.cleanliness(Path::new("/m")).await,
        Cleanliness::Dirty(DirtyReason::StagedChanges)
    );
}

#[tokio::test]
async fn unstaged_changes_are_dirty() {
    let (mock, _) = git_mock(fails_on("diff-files"));
    let client = GitClient::with_executor(mock);

    assert!(client.is_dirty(Path::new("/m")).await);
    assert_eq!(
        client.cleanliness(Path::new("/m")).await,
        Cleanliness::Dirty(DirtyReason::UnstagedChanges)
    );
}

#[tokio::test]
async fn git_not_runnable_is_dirty() {
    let (mock, _) = git_mock(|_| {
        Err(CommandError::NotFound {
            program: "git",
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });
    let client = GitClient::with_executor(mock);

    assert!(matches!(
        client.cleanliness(Path::new("/m")).await,
        Cleanliness::Dirty(DirtyReason::CheckFailed(_))
    ));
}

// ── Commit helper (mocked) ──

#[tokio::test]
async fn commit_skipped_when_clean() {
    let (mock, calls) = git_mock(|_| Ok(String::new()));
    let client = GitClient::with_executor(mock);

    let outcome = client
        .commit_ci_files(Path::new("/m"), Some("update ci"))
        .await
        .unwrap();

    assert_eq!(outcome, CommitOutcome::NothingToCommit);
    assert!(commit_calls(&calls).is_empty());
}

#[tokio::test]
async fn commit_skipped_when_clean_even_without_message() {
    let (mock, _) = git_mock(|_| Ok(String::new()));
    let client = GitClient::with_executor(mock);

    let outcome = client.commit_ci_files(Path::new("/m"), None).await.unwrap();
    assert_eq!(outcome, CommitOutcome::NothingToCommit);
}

#[tokio::test]
async fn dirty_without_message_is_error() {
    for message in [None, Some(""), Some("   ")] {
        let (mock, calls) = git_mock(fails_on("diff-files"));
        let client = GitClient::with_executor(mock);

        let result = client.commit_ci_files(Path::new("/m"), message).await;

        assert!(matches!(
            result,
            Err(CommitError::CommitMessageMissing { ref dir }) if dir == Path::new("/m")
        ));
        assert!(commit_calls(&calls).is_empty());
    }
}

#[tokio::test]
async fn dirty_with_message_commits_exactly_the_ci_files() {
    let (mock, calls) = git_mock(fails_on("diff-files"));
    let client = GitClient::with_executor(mock);

    let outcome = client
        .commit_ci_files(Path::new("/m"), Some("[ci] regenerate templates"))
        .await
        .unwrap();

    assert_eq!(outcome, CommitOutcome::Committed);
    assert_eq!(
        commit_calls(&calls),
        vec![vec![
            "commit",
            ".travis.yml",
            ".travis.after_script.bash",
            ".travis.script.bash",
            "-m",
            "[ci] regenerate templates",
        ]]
    );
}

#[tokio::test]
async fn failed_commit_is_swallowed() {
    let (mock, _) = git_mock(|args| match args[0].as_str() {
        "diff-files" | "commit" => Err(exit_1(args)),
        _ => Ok(String::new()),
    });
    let client = GitClient::with_executor(mock);

    let outcome = client
        .commit_ci_files(Path::new("/m"), Some("msg"))
        .await
        .unwrap();

    assert_eq!(outcome, CommitOutcome::Failed);
}

// ── HEAD ──

#[tokio::test]
async fn head_commit_is_trimmed() {
    let (mock, _) = git_mock(|_| Ok("4f1c2e0d\n".to_owned()));
    let client = GitClient::with_executor(mock);

    assert_eq!(client.head_commit(Path::new("/t")).await.unwrap(), "4f1c2e0d");
}

#[tokio::test]
async fn head_commit_failure_is_error() {
    let (mock, _) = git_mock(|args| Err(exit_1(args)));
    let client = GitClient::with_executor(mock);

    assert!(client.head_commit(Path::new("/t")).await.is_err());
}

// ── Real git repositories ──

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
        .status;
    assert!(status.success(), "git {args:?} failed");
}

/// Initialize a repo with one committed file.
fn init_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "user.email", "test@test.com"]);
    git(dir, &["config", "user.name", "Test"]);
    std::fs::write(dir.join(".travis.yml"), "language: cpp\n").unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", "init"]);
}

#[tokio::test]
async fn real_repo_clean_after_commit() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());

    let client = GitClient::with_executor(RealGitExecutor);
    assert_eq!(client.cleanliness(tmp.path()).await, Cleanliness::Clean);
}

#[tokio::test]
async fn real_repo_modified_file_is_dirty() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());
    std::fs::write(tmp.path().join(".travis.yml"), "language: c\n").unwrap();

    let client = GitClient::with_executor(RealGitExecutor);
    assert_eq!(
        client.cleanliness(tmp.path()).await,
        Cleanliness::Dirty(DirtyReason::UnstagedChanges)
    );
}

#[tokio::test]
async fn real_repo_staged_file_is_dirty() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());
    std::fs::write(tmp.path().join("new.txt"), "x").unwrap();
    git(tmp.path(), &["add", "new.txt"]);

    let client = GitClient::with_executor(RealGitExecutor);
    assert_eq!(
        client.cleanliness(tmp.path()).await,
        Cleanliness::Dirty(DirtyReason::StagedChanges)
    );
}

#[tokio::test]
async fn real_repo_detached_head_is_dirty() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());
    git(tmp.path(), &["checkout", "--detach", "HEAD"]);

    let client = GitClient::with_executor(RealGitExecutor);
    assert_eq!(
        client.cleanliness(tmp.path()).await,
        Cleanliness::Dirty(DirtyReason::DetachedHead)
    );
}

#[tokio::test]
async fn real_repo_untracked_files_are_not_checked() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());
    std::fs::write(tmp.path().join("scratch.txt"), "untracked").unwrap();

    let client = GitClient::with_executor(RealGitExecutor);
    assert_eq!(client.cleanliness(tmp.path()).await, Cleanliness::Clean);
}

#[tokio::test]
async fn real_repo_head_commit_matches_rev_parse() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());

    let expected = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let expected = String::from_utf8(expected.stdout).unwrap();

    let client = GitClient::with_executor(RealGitExecutor);
    assert_eq!(client.head_commit(tmp.path()).await.unwrap(), expected.trim());
}

#[tokio::test]
async fn real_repo_commit_records_regenerated_files() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());
    std::fs::write(tmp.path().join(".travis.after_script.bash"), "#!/bin/bash\n").unwrap();
    std::fs::write(tmp.path().join(".travis.script.bash"), "#!/bin/bash\n").unwrap();
    git(
        tmp.path(),
        &["add", ".travis.after_script.bash", ".travis.script.bash"],
    );
    std::fs::write(tmp.path().join(".travis.yml"), "language: c\n").unwrap();

    let client = GitClient::with_executor(RealGitExecutor);
    let outcome = client
        .commit_ci_files(tmp.path(), Some("regenerate"))
        .await
        .unwrap();

    assert_eq!(outcome, CommitOutcome::Committed);
    assert_eq!(client.cleanliness(tmp.path()).await, Cleanliness::Clean);
}

#[tokio::test]
async fn missing_module_directory_is_reported_as_such() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("dune-xt-grid");

    let err = RealGitExecutor
        .exec(&missing, &["status".to_owned()])
        .await
        .unwrap_err();
    assert!(matches!(&err, CommandError::MissingDir { dir, .. } if dir == &missing));

    let client = GitClient::with_executor(RealGitExecutor);
    match client.cleanliness(&missing).await {
        Cleanliness::Dirty(DirtyReason::CheckFailed(message)) => {
            assert!(message.contains("does not exist"), "{message}");
            assert!(!message.contains("not found on PATH"), "{message}");
        }
        other => panic!("expected CheckFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_command_carries_its_output() {
    let tmp = TempDir::new().unwrap();
    init_repo(tmp.path());

    let err = RealGitExecutor
        .exec(tmp.path(), &["no-such-subcommand".to_owned()])
        .await
        .unwrap_err();
    match err {
        CommandError::CommandFailed { output, .. } => {
            assert!(output.contains("no-such-subcommand"), "{output}");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}
