//! Runs the `rsync-template` binary against manifests given as a path, on stdin, and as `-`.
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const DEMO: &str = r#"
apiVersion: demo.io/v1
kind: RsyncSource
metadata:
  namespace: ns1
  name: demo
spec:
  image: rsync:1.0
  replicas: 2
  hostName: node-a
  password: secret
  volume:
    name: data-vol
    hostPath:
      path: /mnt/data
"#;

fn rsync_template() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rsync-template"));
    cmd.env("RUST_LOG", "rsync_template=error,rsync_source=debug");
    cmd
}

fn write_manifest(file_name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), file_name));
    std::fs::write(&path, contents).expect("failed to write manifest");
    path
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start rsync-template");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn assert_renders_demo(output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(3, stdout.matches("---\n").count());
    assert!(stdout.contains("kind: Deployment"));
    assert!(stdout.contains("kind: ConfigMap"));
    assert!(stdout.contains("kind: Service"));
    assert!(stdout.contains("kubernetes.io/hostname: node-a"));
    assert!(stdout.contains("namespace: ns1"));
}

#[test]
fn renders_manifest_from_a_file() {
    let path = write_manifest("demo.yaml", DEMO);
    let output = rsync_template().arg(&path).output().unwrap();
    let _ = std::fs::remove_file(&path);
    assert_renders_demo(&output);
}

#[test]
fn renders_manifest_from_stdin_without_arguments() {
    let output = run_with_stdin(rsync_template(), DEMO);
    assert_renders_demo(&output);
}

#[test]
fn dash_reads_manifest_from_stdin() {
    let mut cmd = rsync_template();
    cmd.arg("-");
    let output = run_with_stdin(cmd, DEMO);
    assert_renders_demo(&output);
}

#[test]
fn output_is_the_same_for_file_and_stdin() {
    let path = write_manifest("same.yaml", DEMO);
    let from_file = rsync_template().arg(&path).output().unwrap();
    let _ = std::fs::remove_file(&path);
    let from_stdin = run_with_stdin(rsync_template(), DEMO);
    assert_eq!(from_file.stdout, from_stdin.stdout);
}

#[test]
fn invalid_spec_exits_with_an_error_and_prints_nothing() {
    let invalid = DEMO.replace("image: rsync:1.0", "image: \"\"");
    let path = write_manifest("invalid.yaml", &invalid);
    let output = rsync_template().arg(&path).output().unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(Some(1), output.status.code());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("spec.image"));
}

#[test]
fn missing_file_exits_with_an_error() {
    let path = std::env::temp_dir().join("rsync-template-does-not-exist.yaml");
    let output = rsync_template().arg(&path).output().unwrap();
    assert_eq!(Some(1), output.status.code());
    assert!(output.stdout.is_empty());
}

#[test]
fn unparseable_manifest_exits_with_an_error() {
    let output = run_with_stdin(rsync_template(), "spec: [not, a, map]\n");
    assert_eq!(Some(1), output.status.code());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse RsyncSource"));
}
