use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn imgpress_cmd() -> Command {
    let mut cmd = Command::cargo_bin("imgpress").expect("Failed to find imgpress binary");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG").env_remove("IMGPRESS_WORKERS");
    cmd
}

/// `convert` with stand-in tools: `encoder` for JPEG and `true` for exiftool.
fn convert_cmd(input: &Path, output: &Path, encoder: &str) -> Command {
    let mut cmd = imgpress_cmd();
    cmd.arg("convert")
        .arg("--input")
        .arg(input)
        .arg("--output")
        .arg(output)
        .arg("--workers")
        .arg("2")
        .arg("--jpeg-encoder")
        .arg(encoder)
        .arg("--exiftool")
        .arg("true");
    cmd
}

#[test]
fn test_convert_non_existent_input() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;

    let mut cmd = convert_cmd(Path::new("surely/this/does/not/exist"), output_dir.path(), "true");
    cmd.assert().failure().stderr(contains("does not exist"));

    Ok(())
}

#[test]
fn test_convert_missing_encoder_fails_before_any_work() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let scratch = tempdir()?;
    let output = scratch.path().join("out");
    fs::write(input_dir.path().join("a.png"), "png")?;

    let mut cmd = convert_cmd(input_dir.path(), &output, "imgpress-no-such-encoder");
    cmd.assert()
        .failure()
        .stderr(contains("Required tool not found: imgpress-no-such-encoder"));
    assert!(!output.exists());

    Ok(())
}

#[test]
fn test_convert_copies_non_image_files() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    fs::create_dir_all(input_dir.path().join("docs"))?;
    fs::write(input_dir.path().join("docs/readme.txt"), "hello")?;

    let mut cmd = convert_cmd(input_dir.path(), output_dir.path(), "true");
    cmd.assert().success().stderr(contains("processed 1 / 1"));

    assert_eq!(fs::read_to_string(output_dir.path().join("docs/readme.txt"))?, "hello");
    assert!(!output_dir.path().join("error_log.txt").exists());

    Ok(())
}

#[test]
fn test_convert_failures_are_logged_but_exit_zero() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    fs::write(input_dir.path().join("a.png"), "png")?;
    fs::write(input_dir.path().join("b.txt"), "text")?;

    let mut cmd = convert_cmd(input_dir.path(), output_dir.path(), "false");
    cmd.assert().success().stderr(contains("1 file(s) failed"));

    assert!(!output_dir.path().join("a.jpg").exists());
    assert!(!output_dir.path().join("a.jpg.tmp").exists());
    assert!(output_dir.path().join("b.txt").exists());
    let log = fs::read_to_string(output_dir.path().join("error_log.txt"))?;
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("a.png"));

    Ok(())
}

#[test]
fn test_convert_fail_on_error_exits_non_zero() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    fs::write(input_dir.path().join("a.bmp"), "bmp")?;

    let mut cmd = convert_cmd(input_dir.path(), output_dir.path(), "false");
    cmd.arg("--fail-on-error");
    cmd.assert().failure().stderr(contains("failed to convert or copy"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_convert_with_stub_encoder_publishes_output() -> Result<(), Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;

    let tools = tempdir()?;
    let encoder = tools.path().join("fake-cjpegli");
    fs::write(&encoder, "#!/bin/sh\ncp \"$1\" \"$2\"\n")?;
    fs::set_permissions(&encoder, fs::Permissions::from_mode(0o755))?;

    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    fs::create_dir_all(input_dir.path().join("album"))?;
    for name in ["one.png", "two.PNG", "three.jpeg"] {
        fs::write(input_dir.path().join("album").join(name), name)?;
    }

    let mut cmd = convert_cmd(input_dir.path(), output_dir.path(), encoder.to_str().unwrap());
    cmd.assert().success().stderr(contains("processed 3 / 3"));

    let album = output_dir.path().join("album");
    assert_eq!(fs::read_to_string(album.join("one.jpg"))?, "one.png");
    assert_eq!(fs::read_to_string(album.join("two.jpg"))?, "two.PNG");
    assert_eq!(fs::read_to_string(album.join("three.jpg"))?, "three.jpeg");

    // A second run finds every output in place.
    let mut rerun = convert_cmd(input_dir.path(), output_dir.path(), encoder.to_str().unwrap());
    rerun.assert().success().stderr(contains("3 skipped"));

    Ok(())
}
