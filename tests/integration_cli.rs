// Drives the compiled binary for the subcommands that never need a TTY.
// HOME and XDG dirs point into a temp dir so config, logs and the admin
// session stay out of the real user's state.

use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

fn web3setgo(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("web3setgo").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("WEB3SETGO_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn list_quizzes_shows_seeded_content() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("content.db");

    let out = stdout_of(web3setgo(home.path()).arg("--db").arg(&db).args(["list", "quizzes"]));
    assert!(out.contains("web3-basics"));
    assert!(out.contains("bull-or-bear"));

    let out = stdout_of(web3setgo(home.path()).arg("--db").arg(&db).args([
        "list",
        "quizzes",
        "--kind",
        "knowledge",
    ]));
    assert!(out.contains("web3-basics"));
    assert!(!out.contains("bull-or-bear"));
}

#[test]
fn list_simulations_marks_unbuilt_ones() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("content.db");

    let out = stdout_of(web3setgo(home.path()).arg("--db").arg(&db).args(["list", "simulations"]));
    let wallet = out.lines().find(|l| l.contains("create-your-first-wallet")).unwrap();
    assert!(!wallet.contains("coming soon"));
    let tx = out.lines().find(|l| l.contains("send-your-first-transaction")).unwrap();
    assert!(tx.contains("coming soon"));
}

#[test]
fn drafts_are_not_listed_or_readable() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("content.db");

    let out = stdout_of(web3setgo(home.path()).arg("--db").arg(&db).args(["list", "blogs"]));
    assert!(!out.contains("gas-fees-explained"));

    web3setgo(home.path())
        .arg("--db")
        .arg(&db)
        .args(["read", "gas-fees-explained"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn missing_content_exits_with_one() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("content.db");

    for args in [["read", "missing"], ["quiz", "missing"], ["simulate", "missing"]] {
        let output = web3setgo(home.path())
            .arg("--db")
            .arg(&db)
            .args(args)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("not found"), "{args:?}: {stderr}");
    }
}

#[test]
fn admin_commands_need_login() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("content.db");

    let output = web3setgo(home.path())
        .arg("--db")
        .arg(&db)
        .args(["admin", "delete-quiz", "web3-basics"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("admin mode required"));

    web3setgo(home.path())
        .arg("--db")
        .arg(&db)
        .args(["admin", "set-password", "hunter2"])
        .assert()
        .success();
    web3setgo(home.path())
        .arg("--db")
        .arg(&db)
        .args(["admin", "login"])
        .write_stdin("hunter2\n")
        .assert()
        .success();
    web3setgo(home.path())
        .arg("--db")
        .arg(&db)
        .args(["admin", "delete-quiz", "web3-basics"])
        .assert()
        .success();

    let out = stdout_of(web3setgo(home.path()).arg("--db").arg(&db).args(["list", "quizzes"]));
    assert!(!out.contains("web3-basics"));
}

#[test]
fn history_starts_empty() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("content.db");

    let out = stdout_of(web3setgo(home.path()).arg("--db").arg(&db).arg("history"));
    assert!(out.contains("Quiz attempts"));
    assert!(out.contains("none yet"));
}
