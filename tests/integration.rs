// Integration testing can be done either by calling library functions directly or by invoking your CLI as a subprocess.
use predicates::prelude::*;
use std::{
    fs,
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    path::Path,
    thread,
};

const UNREACHABLE_API: &str = "http://127.0.0.1:9/licenses";
const MIT_LICENSE: &str = "MIT License\n\nCopyright (c) [year] [fullname]\n";

/// Answers the license listing and the `mit` text on a local port; returns the listing url.
fn serve_licenses() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let listing = format!(
        r#"[{{"name": "mit.txt", "type": "file", "download_url": "{}/raw/mit.txt"}}]"#,
        base_url
    );
    let text = format!("---\ntitle: MIT License\n---\n\n{}", MIT_LICENSE);

    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut header = String::new();
            while reader.read_line(&mut header).map(|n| n > 2).unwrap_or(false) {
                header.clear();
            }

            let body = match request_line.split_whitespace().nth(1) {
                Some("/licenses") => listing.as_str(),
                Some("/raw/mit.txt") => text.as_str(),
                _ => "",
            };
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
        }
    });

    format!("{}/licenses", base_url)
}

fn pkgcreator(destination: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("pkgcreator").unwrap();

    cmd.env_remove("PKGCREATOR_CONFIG")
        .arg("--destination")
        .arg(destination)
        .args(["--prompt-mode", "no", "--license-api", UNREACHABLE_API]);

    cmd
}

#[test]
fn create_package() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path())
        .arg("demo_package")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"));

    let project = dir.path().join("demo_package");
    for file in [
        "pyproject.toml",
        "README.md",
        ".gitignore",
        "LICENSE",
        "src/demo_package/__init__.py",
    ] {
        assert!(project.join(file).is_file(), "{} is missing", file);
    }
    assert!(!project.join("src/demo_package/__main__.py").exists());

    let manifest = fs::read_to_string(project.join("pyproject.toml")).unwrap();
    assert!(manifest.contains("name = \"demo_package\""));
}

#[test]
fn existing_package_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path()).arg("demo_package").assert().success();
    fs::write(dir.path().join("demo_package/README.md"), "keep me").unwrap();

    pkgcreator(dir.path())
        .arg("demo_package")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));

    let readme = fs::read_to_string(dir.path().join("demo_package/README.md")).unwrap();
    assert_eq!(readme, "keep me");
}

#[test]
fn failed_license_download_still_creates_package() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path())
        .args(["demo_package", "--license", "mit"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not download license 'mit'"));

    let license = fs::read_to_string(dir.path().join("demo_package/LICENSE")).unwrap();
    assert!(license.is_empty());
}

#[test]
fn settings_from_command_line() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path())
        .args([
            "demo_package",
            "--author-name",
            "Ada Lovelace",
            "--github-username",
            "ada",
            "--homepage",
            "https://demo.example.org",
        ])
        .assert()
        .success();

    let manifest = fs::read_to_string(dir.path().join("demo_package/pyproject.toml")).unwrap();
    assert!(manifest.contains("Ada Lovelace"));
    assert!(manifest.contains("https://demo.example.org"));
    assert!(manifest.contains("https://github.com/ada/"));
}

#[test]
fn script_flag_adds_entry_point() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path())
        .args(["demo_package", "--script"])
        .assert()
        .success();

    assert!(dir
        .path()
        .join("demo_package/src/demo_package/__main__.py")
        .is_file());
}

#[test]
fn init_git_commits_everything() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path())
        .args(["demo_package", "--init-git"])
        .assert()
        .success();

    let repository = git2::Repository::open(dir.path().join("demo_package")).unwrap();
    let mut options = git2::StatusOptions::new();
    options.include_untracked(true);

    assert!(repository.head().is_ok());
    assert!(repository.statuses(Some(&mut options)).unwrap().is_empty());
}

#[test]
fn help_is_sentence_styled() {
    assert_cmd::Command::cargo_bin("pkgcreator")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<MODE={ask,yes,no,auto}>"))
        .stdout(predicate::str::contains("Show this help message and exit."))
        .stdout(predicate::str::contains("Project urls"))
        .stdout(predicate::str::contains("Usage: pkgcreator [OPTIONS] <NAME>"))
        .stdout(predicate::str::contains("[default:").not())
        .stdout(predicate::str::contains("[env:").not());
}

#[test]
fn name_is_required() {
    assert_cmd::Command::cargo_bin("pkgcreator")
        .unwrap()
        .env_remove("PKGCREATOR_CONFIG")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<NAME>"));
}

#[test]
fn list_licenses_fails_without_api() {
    assert_cmd::Command::cargo_bin("pkgcreator")
        .unwrap()
        .env_remove("PKGCREATOR_CONFIG")
        .args(["--list-licenses", "--license-api", UNREACHABLE_API])
        .assert()
        .failure();
}

#[test]
fn list_licenses() {
    assert_cmd::Command::cargo_bin("pkgcreator")
        .unwrap()
        .env_remove("PKGCREATOR_CONFIG")
        .args(["--list-licenses", "--license-api", serve_licenses().as_str()])
        .assert()
        .success()
        .stderr(predicate::str::contains("mit"));
}

#[test]
fn license_is_downloaded() {
    let dir = tempfile::tempdir().unwrap();

    assert_cmd::Command::cargo_bin("pkgcreator")
        .unwrap()
        .env_remove("PKGCREATOR_CONFIG")
        .arg("--destination")
        .arg(dir.path())
        .args(["demo_package", "--prompt-mode", "no", "--license", "mit"])
        .args(["--license-api", serve_licenses().as_str()])
        .assert()
        .success();

    let license = fs::read_to_string(dir.path().join("demo_package/LICENSE")).unwrap();
    assert_eq!(license, MIT_LICENSE);
}

#[test]
#[ignore = "requires python with the venv module"]
fn init_venv_installs_package() {
    let dir = tempfile::tempdir().unwrap();

    pkgcreator(dir.path())
        .args(["demo_package", "--init-venv"])
        .assert()
        .success();

    assert!(dir.path().join("demo_package/.venv/.gitignore").is_file());
}
