use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

fn transplant() -> Command {
    Command::cargo_bin("transplant").unwrap()
}

#[test]
fn test_cli_serialize_deserialize_cycle() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: Create a temporary directory and some test files
    let source_dir = tempdir()?;
    let file1_path = source_dir.path().join("file1.txt");
    let nested_dir = source_dir.path().join("nested");
    fs::create_dir(&nested_dir)?;
    let nested_file_path = nested_dir.join("nested_file.dat");

    let mut file1 = fs::File::create(&file1_path)?;
    writeln!(file1, "Hello, this is the first file.")?;
    fs::write(&nested_file_path, [0u8, 1, 2, 3, 4, 5])?;

    // 2. Serialize to stdout
    let output = transplant()
        .arg("-s")
        .arg("-p")
        .arg(source_dir.path())
        .output()?;
    assert!(output.status.success());
    let stream = output.stdout;
    assert_eq!(&stream[..3], &[0x0C, 0x0D, 0xED]);

    // 3. Deserialize from stdin into a new directory
    let extract_dir = tempdir()?;
    let target = extract_dir.path().join("copy");
    transplant()
        .arg("-d")
        .arg("-p")
        .arg(&target)
        .write_stdin(stream)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // 4. Verify the rebuilt files
    assert_eq!(fs::read(target.join("file1.txt"))?, fs::read(&file1_path)?);
    assert_eq!(
        fs::read(target.join("nested/nested_file.dat"))?,
        fs::read(&nested_file_path)?
    );
    Ok(())
}

#[test]
fn test_cli_serialize_defaults_to_current_directory() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("here.txt"), b"here")?;

    let from_cwd = transplant()
        .current_dir(source_dir.path())
        .arg("-s")
        .output()?;
    let from_path = transplant().arg("-s").arg("-p").arg(source_dir.path()).output()?;
    assert!(from_cwd.status.success());
    assert_eq!(from_cwd.stdout, from_path.stdout);
    Ok(())
}

#[test]
fn test_cli_clobber_flag() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("f"), b"fresh")?;
    let stream = transplant().arg("-s").arg("-p").arg(source_dir.path()).output()?.stdout;

    let target = tempdir()?;
    fs::write(target.path().join("f"), b"stale")?;

    transplant()
        .arg("-d")
        .arg("-p")
        .arg(target.path())
        .write_stdin(stream.clone())
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
    assert_eq!(fs::read(target.path().join("f"))?, b"stale");

    transplant()
        .arg("-d")
        .arg("-c")
        .arg("-p")
        .arg(target.path())
        .write_stdin(stream)
        .assert()
        .success();
    assert_eq!(fs::read(target.path().join("f"))?, b"fresh");
    Ok(())
}

#[test]
fn test_cli_list() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("file1.txt"), b"abc")?;
    fs::create_dir(source_dir.path().join("nested"))?;
    fs::write(source_dir.path().join("nested/inner.log"), b"")?;
    let stream = transplant().arg("-s").arg("-p").arg(source_dir.path()).output()?.stdout;

    transplant()
        .arg("-l")
        .write_stdin(stream.clone())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("file1.txt")
                .and(predicate::str::contains("nested/inner.log"))
                .and(predicate::str::contains("dir ")),
        );

    transplant()
        .arg("-l")
        .arg("--json")
        .write_stdin(stream)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""path": "nested/inner.log""#));
    Ok(())
}

#[test]
fn test_cli_rejects_corrupt_input() {
    transplant()
        .arg("-d")
        .arg("-p")
        .arg(tempdir().unwrap().path())
        .write_stdin(b"not a transplant stream".to_vec())
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt stream"));
}

#[test]
fn test_cli_help_and_usage_errors() {
    transplant()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("--serialize").and(predicate::str::contains("--clobber")));

    transplant().assert().failure();
    transplant().arg("-s").arg("-d").assert().failure();
    transplant().arg("-s").arg("-c").assert().failure();
    transplant().arg("-x").assert().failure();
}
