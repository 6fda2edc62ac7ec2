//! End-to-end tests: runs the built binary against the fixture project.
//!
//! Each test copies `fixtures/site` into a temp dir so builds never touch the
//! checked-in fixtures.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ===========================================================================
// Helpers
// ===========================================================================

fn fixture_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn run(project: &Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_tutorial-press");
    Command::new(bin)
        .args(args)
        .arg("--source")
        .arg(project)
        .arg("--output")
        .arg(project.join("dist"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tutorial-press")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ===========================================================================
// Commands
// ===========================================================================

#[test]
fn routes_json_lists_every_content_file() {
    let project = fixture_project();
    let output = run(project.path(), &["routes", "--json"]);
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "paths": [
                {"params": {"page": ["advanced", "drafts", "wip"]}},
                {"params": {"page": ["basics"]}},
                {"params": {"page": ["intro", "setup"]}},
            ],
            "fallback": false,
        })
    );
}

#[test]
fn routes_plain_listing() {
    let project = fixture_project();
    let output = run(project.path(), &["routes"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("002 basics"));
    assert!(text.contains("    Source: intro/setup.mdx"));
    assert!(!text.contains("secret"));
}

#[test]
fn check_reports_content_without_writing() {
    let project = fixture_project();
    let output = run(project.path(), &["check"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Work in Progress (draft) → advanced/drafts/wip"));
    assert!(text.contains("Checked 3 pages (1 draft)"));
    assert!(!project.path().join("dist").exists());
}

#[test]
fn build_writes_site() {
    let project = fixture_project();
    let output = run(project.path(), &["build"]);
    assert!(output.status.success(), "{output:?}");

    let dist = project.path().join("dist");
    for rel in [
        "index.html",
        "routes.json",
        "blog/index.html",
        "blog/basics/index.html",
        "blog/intro/setup/index.html",
    ] {
        assert!(dist.join(rel).is_file(), "missing {rel}");
    }
    assert!(!dist.join("blog/advanced").exists());

    let copied: Vec<_> = std::fs::read_dir(dist.join("tutorial_files"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(copied.len(), 1);
    assert!(copied[0].ends_with("-diagram.png"));

    let text = stdout(&output);
    assert!(text.contains("Generated 2 pages, 1 linked file (1 draft skipped)"));
}

#[test]
fn build_warns_about_missing_linked_file() {
    let project = fixture_project();
    let output = run(project.path(), &["build"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("linked file not found"), "{stderr}");
}

#[test]
fn missing_content_root_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["routes"]);
    assert!(!output.status.success());
}

#[test]
fn invalid_config_fails() {
    let project = fixture_project();
    std::fs::write(project.path().join("config.toml"), "unknown_key = 1\n").unwrap();
    let output = run(project.path(), &["build"]);
    assert!(!output.status.success());
}

#[test]
fn gen_config_prints_stock_config() {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["gen-config"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("content_root"));
    assert!(text.contains("route_prefix"));
}
