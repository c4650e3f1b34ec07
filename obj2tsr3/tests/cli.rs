use std::fs;
use std::process::Command;

fn obj2tsr3() -> Command {
    Command::new(env!("CARGO_BIN_EXE_obj2tsr3"))
}

#[test]
fn missing_argument_is_usage_error() {
    let output = obj2tsr3().output().expect("run obj2tsr3");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn conversion_failure_prints_one_error_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let obj = dir.path().join("broken.obj");
    fs::write(&obj, "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1\n").expect("write obj");

    let output = obj2tsr3()
        .arg(&obj)
        .arg("--export-dir")
        .arg(dir.path())
        .env("RUST_LOG", "off")
        .env("RUST_BACKTRACE", "0")
        .output()
        .expect("run obj2tsr3");

    assert!(!output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        format!(
            "Error: {}:4: face declared before any material was selected\n",
            obj.display()
        )
    );
}

#[test]
fn missing_input_prints_one_error_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let obj = dir.path().join("absent.obj");

    let output = obj2tsr3()
        .arg(&obj)
        .arg("--export-dir")
        .arg(dir.path())
        .env("RUST_LOG", "off")
        .env("RUST_BACKTRACE", "0")
        .output()
        .expect("run obj2tsr3");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let prefix = format!("Error: cannot open \"{}\": ", obj.display());
    assert!(stderr.starts_with(&prefix), "stderr: {stderr}");
    assert_eq!(stderr.lines().count(), 1, "stderr: {stderr}");
    assert!(stderr.ends_with('\n'));
}

#[test]
fn successful_conversion_writes_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let obj = dir.path().join("tri.obj");
    fs::write(
        &obj,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nusemtl foo\nf 1/1/1 2/1/1 3/1/1\n",
    )
    .expect("write obj");
    let out = dir.path().join("out");

    let output = obj2tsr3()
        .arg(&obj)
        .arg("--export-dir")
        .arg(&out)
        .arg("--sequential")
        .output()
        .expect("run obj2tsr3");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 vertices, 3 indices (each vertex used 1.0 times in avg)"));
    assert!(out.join("tri/foo.ia8").is_file());
    assert!(out.join("tri/collision.ia3").is_file());
    assert!(out.join("tri.tmdl").is_file());
}
