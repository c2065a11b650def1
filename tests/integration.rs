use std::path::Path;
use std::process::Command;

fn embedsync_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_embedsync"));
    cmd.current_dir(dir);
    cmd
}

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn view_resolves_tokens_for_scope() {
    let out = embedsync_cmd(&fixture("basic"))
        .args([
            "view",
            "note.md",
            "--resource-group",
            "project",
            "--resource-id",
            "p-1",
        ])
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "view failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains(
            "![logo](https://console.example.dev/api/files/p-1/file-abc123?token=testtoken)"
        ),
        "token not resolved: {stdout}"
    );
    assert!(
        stdout.contains("![cat](https://elsewhere.example.com/cat.png)"),
        "external image was rewritten: {stdout}"
    );
}

#[test]
fn upload_reverses_view() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixture("basic").join(".embedsync.toml"),
        dir.path().join(".embedsync.toml"),
    )
    .unwrap();

    let view = embedsync_cmd(&fixture("basic"))
        .args([
            "view",
            "note.md",
            "--resource-group",
            "project",
            "--resource-id",
            "p-1",
        ])
        .output()
        .unwrap();
    assert!(view.status.success());
    std::fs::write(dir.path().join("draft.md"), &view.stdout).unwrap();

    let upload = embedsync_cmd(dir.path())
        .args(["upload", "draft.md"])
        .output()
        .unwrap();
    assert!(
        upload.status.success(),
        "upload failed: {}",
        String::from_utf8_lossy(&upload.stderr)
    );

    let original = std::fs::read_to_string(fixture("basic").join("note.md")).unwrap();
    assert_eq!(String::from_utf8_lossy(&upload.stdout), original);
}

#[test]
fn file_ids_as_json() {
    let out = embedsync_cmd(&fixture("basic"))
        .args(["file-ids", "note.md", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let ids: Vec<String> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(ids, vec!["file-abc123".to_string()]);
}

#[test]
fn scan_lists_referenced_ids() {
    let out = embedsync_cmd(&fixture("basic"))
        .args(["scan", "."])
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("note.md\tfile-abc123"),
        "scan missed the reference: {stdout}"
    );
}

#[test]
fn scan_continues_past_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("good.md"), "![a](<file-good>)").unwrap();
    std::fs::write(dir.path().join("broken.md"), [0xFF, 0xFE, 0x00, 0x9F]).unwrap();

    let out = embedsync_cmd(dir.path()).args(["scan", "."]).output().unwrap();
    assert!(
        out.status.success(),
        "scan failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("good.md\tfile-good"),
        "readable file was not scanned: {stdout}"
    );
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("broken.md"),
        "skipped file was not reported"
    );
}

#[test]
fn init_writes_config_then_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();

    let first = embedsync_cmd(dir.path())
        .args(["init", "--base-uri", "https://host/api"])
        .output()
        .unwrap();
    assert!(
        first.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    let written = std::fs::read_to_string(dir.path().join(".embedsync.toml")).unwrap();
    assert!(written.contains("base_uri = \"https://host/api\""));
    assert!(written.contains("# embedsync project configuration."));

    let second = embedsync_cmd(dir.path()).arg("init").output().unwrap();
    assert!(!second.status.success(), "init overwrote an existing config");
}

#[test]
fn upload_without_base_uri_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("draft.md"), "![a](<file-a>)").unwrap();

    let out = embedsync_cmd(dir.path())
        .args(["upload", "draft.md"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("base URI not configured"),
        "unexpected error output"
    );
}
