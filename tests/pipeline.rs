//! End-to-end pipeline tests
//!
//! Drives the orchestrator against fake vendored libraries (shell-script
//! configure and build steps) and a recording extension host, covering the
//! full bundled scenario, the idempotent rerun, and the system-library
//! bypass.

use lith::test_utils::{RecordingHost, fake_vendored_library, project_config};
use lith::{BuildMode, ConfigureOutcome, Orchestrator};
use std::fs;
use tempfile::TempDir;

#[test]
fn bundled_build_from_fresh_checkout_then_idempotent_rerun() {
    let temp = TempDir::new().unwrap();
    let config = project_config(temp.path());
    fake_vendored_library(&config.source_dir(), false, &["libdemo.a", "zlib/libz.a"]);

    // First invocation: stage, configure, build, discover two archives.
    let mut host = RecordingHost::default();
    let report = Orchestrator::new(&config).run(&mut host).unwrap();

    assert_eq!(report.mode, BuildMode::Bundled);
    assert!(report.staged > 0, "fresh checkout must stage files");
    assert_eq!(report.configure, Some(ConfigureOutcome::Configured));
    assert!(report.features.is_empty());
    assert_eq!(report.stale_removed, 0, "nothing to invalidate yet");
    assert_eq!(report.archives.len(), 2);
    assert_eq!(host.link_objects.len(), 2);
    assert_eq!(host.builds, 1);

    // Simulate the linked extension binary the host would have produced.
    let ext_dir = config.extension_output_dir();
    fs::create_dir_all(&ext_dir).unwrap();
    let linked = ext_dir.join("demo_wrap.so");
    fs::write(&linked, "elf").unwrap();

    // Second identical invocation: configure skipped, same archives
    // rediscovered, the existing binary forcibly deleted before relink.
    let mut host = RecordingHost::default();
    let rerun = Orchestrator::new(&config).run(&mut host).unwrap();

    assert_eq!(rerun.configure, Some(ConfigureOutcome::SkippedExisting));
    assert_eq!(rerun.staged, 0, "unchanged source must copy nothing");
    assert_eq!(rerun.archives, report.archives);
    assert_eq!(rerun.stale_removed, 1);
    assert!(!linked.exists(), "stale binary must be gone before the link");
    assert_eq!(host.builds, 1);
}

#[test]
fn toolchain_reaches_the_vendored_configure_script() {
    let temp = TempDir::new().unwrap();
    let config = project_config(temp.path());
    fake_vendored_library(&config.source_dir(), false, &["libdemo.a"]);

    let mut host = RecordingHost::default();
    Orchestrator::new(&config).run(&mut host).unwrap();

    let recorded =
        fs::read_to_string(config.staged_dir().join("configure-args.txt")).unwrap();
    let lines: Vec<&str> = recorded.lines().collect();

    assert!(lines.contains(&"--with-bzip2"));
    assert!(lines.contains(&"CC=cc"));
    assert!(lines.contains(&"CFLAGS=-testing"));
}

#[test]
fn bzip2_detection_flows_through_to_the_link_step() {
    let temp = TempDir::new().unwrap();
    let config = project_config(temp.path());
    fake_vendored_library(&config.source_dir(), true, &["libdemo.a"]);

    let mut host = RecordingHost::default();
    let report = Orchestrator::new(&config).run(&mut host).unwrap();

    assert!(report.features.contains("bzip2"));
    assert_eq!(host.libraries, vec!["bz2"]);
}

#[test]
fn system_mode_skips_the_entire_vendored_pipeline() {
    let temp = TempDir::new().unwrap();
    // No vendored source exists; system mode must never notice.
    let mut config = project_config(temp.path());
    config.build.use_system_library = true;

    let mut host = RecordingHost::default();
    let report = Orchestrator::new(&config).run(&mut host).unwrap();

    assert_eq!(report.mode, BuildMode::System);
    assert_eq!(host.link_flags, vec!["-ldemo"]);
    assert!(host.link_objects.is_empty());
    assert!(host.include_dirs.is_empty());
    assert_eq!(host.builds, 1);
    assert!(!config.staged_dir().exists());
    assert!(!config.source_dir().exists());
}

#[test]
fn editing_one_vendored_file_restages_only_that_file() {
    let temp = TempDir::new().unwrap();
    let config = project_config(temp.path());
    fake_vendored_library(&config.source_dir(), false, &["libdemo.a"]);

    let mut host = RecordingHost::default();
    Orchestrator::new(&config).run(&mut host).unwrap();

    // Bump one header's mtime well past the staged copy.
    let header = config.source_dir().join("demo.h");
    fs::write(&header, "#define DEMO_VERSION \"1.0.1\"\n").unwrap();
    let file = fs::OpenOptions::new().write(true).open(&header).unwrap();
    file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(5))
        .unwrap();

    let mut host = RecordingHost::default();
    let rerun = Orchestrator::new(&config).run(&mut host).unwrap();

    assert_eq!(rerun.staged, 1);
    assert_eq!(
        fs::read_to_string(config.staged_dir().join("demo.h")).unwrap(),
        "#define DEMO_VERSION \"1.0.1\"\n"
    );
    // Configure stays done; editing a header never re-runs it.
    assert_eq!(rerun.configure, Some(ConfigureOutcome::SkippedExisting));
}
