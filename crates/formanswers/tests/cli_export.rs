use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_formanswers"))
        .args(args)
        .env("FORMANSWERS_HOME", home)
        .env_remove("FORMANSWERS_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("run formanswers")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "status={:?} stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_submit_export_and_remove() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let db = home.path().join("answers.sqlite3");
    let db_arg = db.to_str().unwrap();

    for answers in [r#"{"name":"Zoë","city":"Köln"}"#, r#"{"name":"Ada"}"#] {
        let output = run_cli(
            home.path(),
            &["--db", db_arg, "submit", "--scope", "9", "--form", "contact", answers],
        );
        assert_success(&output);
    }

    let output = run_cli(
        home.path(),
        &[
            "--db",
            db_arg,
            "export",
            "--scope",
            "9",
            "--file-name",
            "contacts",
            "--out",
            out.path().to_str().unwrap(),
            "--json",
        ],
    );
    assert_success(&output);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["entries"], 2);
    assert_eq!(summary["marked"], 2);
    assert_eq!(summary["charset"], "iso-8859-1");

    let bytes = std::fs::read(out.path().join("contacts.csv")).unwrap();
    // Latin-1: 'ë' and 'ö' are single bytes.
    assert!(bytes.windows(3).any(|w| w == [b'Z', b'o', 0xEB]));
    assert!(bytes.starts_with(b"form,created_at,name,city\n"));

    let output = run_cli(
        home.path(),
        &["--db", db_arg, "prepare-remove", "--scope", "9", "--json"],
    );
    assert_success(&output);
    let pending: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(pending["pending"], 0);

    assert_success(&run_cli(
        home.path(),
        &["--db", db_arg, "delete-form", "contact", "--scope", "9"],
    ));

    let refused = run_cli(home.path(), &["--db", db_arg, "remove", "--scope", "9"]);
    assert_eq!(refused.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&refused.stderr).contains("cannot be undone"));

    assert_success(&run_cli(
        home.path(),
        &["--db", db_arg, "remove", "--scope", "9", "--yes"],
    ));

    let output = run_cli(home.path(), &["--db", db_arg, "list", "--json"]);
    assert_success(&output);
    let overview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(overview, serde_json::json!([]));
}

#[test]
fn test_export_without_matches_exits_with_two() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let db = home.path().join("answers.sqlite3");

    let output = run_cli(
        home.path(),
        &[
            "--db",
            db.to_str().unwrap(),
            "export",
            "--scope",
            "3",
            "--out",
            out.path().to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No entries found with your criteria"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_answers_are_rejected() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("answers.sqlite3");

    let output = run_cli(
        home.path(),
        &[
            "--db",
            db.to_str().unwrap(),
            "submit",
            "--scope",
            "3",
            "--form",
            "contact",
            "[1,2]",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Answers must be a JSON object"));
}

#[test]
fn test_failed_write_leaves_entries_pending() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("answers.sqlite3");
    let db_arg = db.to_str().unwrap();
    let blocker = home.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let out = blocker.join("sub");

    assert_success(&run_cli(
        home.path(),
        &["--db", db_arg, "submit", "--scope", "5", "--form", "contact", r#"{"name":"A"}"#],
    ));

    let output = run_cli(
        home.path(),
        &["--db", db_arg, "export", "--scope", "5", "--out", out.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to write export"));

    let output = run_cli(home.path(), &["--db", db_arg, "list", "--json"]);
    assert_success(&output);
    let overview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(overview[0]["formName"], "contact");
    assert_eq!(overview[0]["exported"], 0);
    assert_eq!(overview[0]["active"], 1);
}
