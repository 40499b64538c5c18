/*!
 * Integration tests driving the acadfs binary
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn acadfs(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_acadfs"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("ACADFS_ADMIN_PASSWORD")
        .env_remove("ACADFS_EXPECTED_USER")
        .env_remove("ACADFS_EXPECTED_PASSWORD")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_admin_upload_then_student_browse() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("data");
    fs::create_dir(&root).unwrap();

    let local = temp_dir.path().join("question_bank.pdf");
    fs::write(&local, b"%PDF-1.4 sample").unwrap();

    let output = acadfs(
        &root,
        &[
            "upload",
            "CS",
            "5",
            "DS",
            "2023",
            local.to_str().unwrap(),
            "--password",
            "admin123",
        ],
    );
    assert!(output.status.success(), "{:?}", output);

    let output = acadfs(&root, &["--format", "json", "materials", "CS", "5", "DS", "2023"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value[0]["name"], "question_bank.pdf");
    assert_eq!(value[0]["extension"], ".pdf");
    assert_eq!(value[0]["size"], 15);

    let output = acadfs(&root, &["branches"]);
    assert!(stdout(&output).contains("CS"));

    let saved = temp_dir.path().join("copy.pdf");
    let output = acadfs(
        &root,
        &[
            "download",
            "CS",
            "5",
            "DS",
            "2023",
            "question_bank.pdf",
            "--output",
            saved.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(fs::read(&saved).unwrap(), b"%PDF-1.4 sample");
}

#[test]
fn test_admin_commands_need_credentials() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    let output = acadfs(root, &["mkdir", "CS", "5"]);
    assert!(!output.status.success());

    let output = acadfs(root, &["mkdir", "CS", "5", "--password", "wrong"]);
    assert!(!output.status.success());
    assert!(!root.join("CS").exists());

    let output = acadfs(root, &["mkdir", "CS", "5", "--password", "admin123"]);
    assert!(output.status.success());
    assert!(root.join("CS").join("5").is_dir());
}

#[test]
fn test_rmtree_and_missing_targets() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("CS/5/DS/2023")).unwrap();
    fs::write(root.join("CS/5/DS/2023/solutions.pdf"), b"x").unwrap();

    let output = acadfs(root, &["rmtree", "CS", "5", "--password", "admin123"]);
    assert!(output.status.success());
    assert!(!root.join("CS/5").exists());
    assert!(root.join("CS").is_dir());

    let output = acadfs(root, &["rmtree", "CS", "5", "--password", "admin123"]);
    assert!(!output.status.success());

    let output = acadfs(
        root,
        &["delete", "CS", "5", "DS", "2023", "x.pdf", "--password", "admin123"],
    );
    assert!(!output.status.success());
}

#[test]
fn test_classify_without_root() {
    let temp_dir = tempdir().unwrap();
    let output = acadfs(
        &temp_dir.path().join("absent"),
        &["classify", "endsem_paper_CS_5_DS_2023.pdf"],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("End Semester Paper"));
}

#[test]
fn test_missing_root_is_reported() {
    let temp_dir = tempdir().unwrap();
    let output = acadfs(&temp_dir.path().join("absent"), &["branches"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
