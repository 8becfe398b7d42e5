//! Unit tests for install orchestration.

use super::*;
use crate::artefact::download::MockFetcher;
use crate::test_utils::{StubFetcher, StubResponse, sha256_hex, staging_leftovers};
use rstest::{fixture, rstest};

const BASE_URL: &str = "https://example.test/releases";
const BINARY_URL: &str = "https://example.test/releases/latest/download/zetten-linux-x86_64";
const CHECKSUM_URL: &str =
    "https://example.test/releases/latest/download/zetten-linux-x86_64.sha256";
const PAYLOAD: &[u8] = b"ABC";
/// SHA-256 of lowercase `abc`, so never the digest of `PAYLOAD`.
const MISMATCHED_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

struct Prefix {
    _temp: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Prefix {
    fn bin_dir(&self) -> Utf8PathBuf {
        self.root.join("bin")
    }

    fn target(&self) -> Utf8PathBuf {
        self.bin_dir().join("zetten")
    }

    fn leftovers(&self) -> Vec<String> {
        staging_leftovers(self.bin_dir().as_std_path())
    }
}

#[fixture]
fn prefix() -> Prefix {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().join("prefix")).expect("UTF-8 path");
    Prefix { _temp: temp, root }
}

fn linux_config(prefix: &Prefix) -> InstallConfig {
    InstallConfig {
        base_url: BASE_URL.to_owned(),
        platform: Some("linux".to_owned()),
        ..InstallConfig::new(prefix.root.clone())
    }
}

fn sidecar_for(payload: &[u8]) -> String {
    format!("{}  zetten-linux-x86_64\n", sha256_hex(payload))
}

fn published(payload: &[u8], sidecar: &str) -> StubFetcher {
    StubFetcher::new()
        .with_body(BINARY_URL, payload)
        .with_body(CHECKSUM_URL, sidecar)
}

#[rstest]
fn verified_binary_is_installed(prefix: Prefix) {
    let fetcher = published(PAYLOAD, &sidecar_for(PAYLOAD));
    let mut progress = Vec::new();

    let report = install_with(&linux_config(&prefix), &fetcher, &mut progress).expect("install");

    assert_eq!(report.target, prefix.target());
    assert_eq!(report.digest.as_str(), sha256_hex(PAYLOAD));
    assert_eq!(report.binary_url, BINARY_URL);
    assert_eq!(std::fs::read(prefix.target()).expect("read target"), PAYLOAD);
    assert_eq!(fetcher.requested(), vec![BINARY_URL, CHECKSUM_URL]);
    assert!(prefix.leftovers().is_empty());

    let text = String::from_utf8(progress).expect("progress was not UTF-8");
    assert!(text.contains(&format!("Downloading {BINARY_URL}")));
    assert!(text.contains("Verifying checksum..."));
}

#[cfg(unix)]
#[rstest]
fn installed_binary_is_executable(prefix: Prefix) {
    use std::os::unix::fs::PermissionsExt;

    let fetcher = published(PAYLOAD, &sidecar_for(PAYLOAD));
    install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink()).expect("install");

    let mode = std::fs::metadata(prefix.target())
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, crate::install_target::EXECUTABLE_MODE);
}

#[rstest]
fn checksum_mismatch_installs_nothing(prefix: Prefix) {
    let fetcher = published(PAYLOAD, &format!("{MISMATCHED_DIGEST}\n"));

    let err = install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink())
        .expect_err("mismatch");

    match &err {
        InstallError::Integrity(integrity) => {
            assert_eq!(integrity.expected, MISMATCHED_DIGEST);
            assert_eq!(integrity.actual, sha256_hex(PAYLOAD));
        }
        other => panic!("expected Integrity, got {other:?}"),
    }
    assert_eq!(err.stage(), InstallStage::Verifying);
    assert!(err.hint().is_some());
    assert!(!prefix.target().exists());
    assert!(prefix.leftovers().is_empty());
}

#[rstest]
fn checksum_mismatch_keeps_previous_install(prefix: Prefix) {
    std::fs::create_dir_all(prefix.bin_dir()).expect("create bin dir");
    std::fs::write(prefix.target(), b"previous release").expect("seed target");
    let fetcher = published(PAYLOAD, &sidecar_for(b"something else"));

    install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink()).expect_err("mismatch");

    assert_eq!(
        std::fs::read(prefix.target()).expect("read target"),
        b"previous release"
    );
    assert!(prefix.leftovers().is_empty());
}

#[rstest]
fn successful_install_replaces_previous_binary(prefix: Prefix) {
    std::fs::create_dir_all(prefix.bin_dir()).expect("create bin dir");
    std::fs::write(prefix.target(), b"previous release").expect("seed target");
    let fetcher = published(PAYLOAD, &sidecar_for(PAYLOAD));

    install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink()).expect("install");

    assert_eq!(std::fs::read(prefix.target()).expect("read target"), PAYLOAD);
}

#[rstest]
fn missing_binary_stops_before_checksum(prefix: Prefix) {
    let fetcher = StubFetcher::new()
        .with(BINARY_URL, StubResponse::NotFound)
        .with_body(CHECKSUM_URL, sidecar_for(PAYLOAD));

    let err = install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink())
        .expect_err("404");

    assert!(matches!(
        &err,
        InstallError::Download { stage: InstallStage::FetchingBinary, source }
            if source.is_not_found() && source.url() == BINARY_URL
    ));
    assert!(
        err.hint()
            .is_some_and(|hint| hint.contains("may not be published yet"))
    );
    assert_eq!(fetcher.requested(), vec![BINARY_URL]);
    assert!(!prefix.target().exists());
    assert!(prefix.leftovers().is_empty());
}

#[rstest]
fn checksum_download_failure_removes_staged_binary(prefix: Prefix) {
    let fetcher = StubFetcher::new()
        .with_body(BINARY_URL, PAYLOAD)
        .with(CHECKSUM_URL, StubResponse::Status(500));

    let err = install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink())
        .expect_err("500");

    assert!(matches!(
        &err,
        InstallError::Download {
            stage: InstallStage::FetchingChecksum,
            source: DownloadError::Status { status: 500, .. },
        }
    ));
    assert!(err.hint().is_none());
    assert!(!prefix.target().exists());
    assert!(prefix.leftovers().is_empty());
}

#[rstest]
fn empty_sidecar_is_a_checksum_error(prefix: Prefix) {
    let fetcher = published(PAYLOAD, "\n  \n");

    let err = install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink())
        .expect_err("empty sidecar");

    assert!(matches!(err, InstallError::Checksum(ChecksumError::Empty)));
    assert!(!prefix.target().exists());
    assert!(prefix.leftovers().is_empty());
}

#[rstest]
fn uppercase_sidecar_digest_is_accepted(prefix: Prefix) {
    let sidecar = format!("\u{feff}{}\n", sha256_hex(PAYLOAD).to_uppercase());
    let fetcher = published(PAYLOAD, &sidecar);

    install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink()).expect("install");

    assert!(prefix.target().exists());
}

#[rstest]
fn tagged_release_fetches_from_release_path(prefix: Prefix) {
    let binary_url = "https://example.test/releases/download/v1.0.1/zetten-linux-x86_64";
    let checksum_url = format!("{binary_url}.sha256");
    let fetcher = StubFetcher::new()
        .with_body(binary_url, PAYLOAD)
        .with_body(checksum_url.clone(), sidecar_for(PAYLOAD));
    let config = InstallConfig {
        release: Some("v1.0.1".to_owned()),
        ..linux_config(&prefix)
    };

    install_with(&config, &fetcher, &mut std::io::sink()).expect("install");

    assert_eq!(fetcher.requested(), vec![binary_url.to_owned(), checksum_url]);
}

#[rstest]
fn unsupported_platform_never_fetches(prefix: Prefix) {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();
    let config = InstallConfig {
        platform: Some("plan9".to_owned()),
        ..linux_config(&prefix)
    };

    let err = install_with(&config, &fetcher, &mut std::io::sink()).expect_err("plan9");

    match &err {
        InstallError::UnsupportedPlatform(unsupported) => {
            assert_eq!(unsupported.platform, "plan9");
        }
        other => panic!("expected UnsupportedPlatform, got {other:?}"),
    }
    assert_eq!(err.stage(), InstallStage::Resolving);
    assert!(!prefix.root.exists());
}

#[rstest]
fn unusable_prefix_fails_before_fetching(prefix: Prefix) {
    std::fs::create_dir_all(&prefix.root).expect("create prefix");
    std::fs::write(prefix.bin_dir(), b"not a directory").expect("block bin dir");
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().never();

    let err = install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink())
        .expect_err("bin is a file");

    assert!(matches!(
        err,
        InstallError::Staging {
            stage: InstallStage::FetchingBinary,
            ..
        }
    ));
}

#[rstest]
fn fetcher_receives_staging_path_inside_install_dir(prefix: Prefix) {
    let bin_dir = prefix.bin_dir();
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .withf(move |_url, destination| {
            destination.parent() == Some(bin_dir.as_std_path())
                && destination
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(crate::staging::is_staging_name)
        })
        .times(2)
        .returning(|url, destination| {
            let body = if url.ends_with(".sha256") {
                sidecar_for(PAYLOAD).into_bytes()
            } else {
                PAYLOAD.to_vec()
            };
            std::fs::write(destination, body).map_err(|source| DownloadError::Io {
                url: url.to_owned(),
                source,
            })
        });

    install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink()).expect("install");
}

#[rstest]
#[case::linux("linux", "bin/zetten", "zetten-linux-x86_64")]
#[case::macos("macos", "bin/zetten", "zetten-macos-arm64")]
#[case::windows("windows", "Scripts/zetten.exe", "zetten-windows-x86_64.exe")]
fn plan_resolves_artefact_and_target(
    prefix: Prefix,
    #[case] os: &str,
    #[case] relative_target: &str,
    #[case] artifact: &str,
) {
    let config = InstallConfig {
        platform: Some(os.to_owned()),
        ..linux_config(&prefix)
    };

    let plan = plan(&config).expect("plan");

    assert_eq!(plan.artifact.as_str(), artifact);
    assert!(plan.target.path().ends_with(relative_target));
    assert!(plan.location.binary_url().ends_with(artifact));
    assert!(!prefix.root.exists());
}

#[rstest]
fn publish_lock_lives_in_install_dir(prefix: Prefix) {
    let fetcher = published(PAYLOAD, &sidecar_for(PAYLOAD));

    install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink()).expect("install");

    assert!(prefix.bin_dir().join(LOCK_FILE_NAME).is_file());
}

#[cfg(unix)]
#[rstest]
fn windows_target_is_not_marked_executable(prefix: Prefix) {
    use std::os::unix::fs::PermissionsExt;

    let binary_url = "https://example.test/releases/latest/download/zetten-windows-x86_64.exe";
    let fetcher = StubFetcher::new()
        .with_body(binary_url, PAYLOAD)
        .with_body(format!("{binary_url}.sha256"), sidecar_for(PAYLOAD));
    let config = InstallConfig {
        platform: Some("windows".to_owned()),
        ..linux_config(&prefix)
    };

    let report = install_with(&config, &fetcher, &mut std::io::sink()).expect("install");

    assert!(report.target.ends_with("Scripts/zetten.exe"));
    let mode = std::fs::metadata(&report.target)
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0, "unexpected mode {mode:o}");
}

#[rstest]
fn failed_rename_reports_publishing_and_cleans_up(prefix: Prefix) {
    let occupied = prefix.target();
    std::fs::create_dir_all(&occupied).expect("create directory at target");
    std::fs::write(occupied.join("keep"), b"occupied").expect("fill directory");
    let fetcher = published(PAYLOAD, &sidecar_for(PAYLOAD));

    let err = install_with(&linux_config(&prefix), &fetcher, &mut std::io::sink())
        .expect_err("target is a non-empty directory");

    assert!(matches!(
        &err,
        InstallError::Publish(PublishError::Rename { path, .. }) if *path == occupied
    ));
    assert_eq!(err.stage(), InstallStage::Publishing);
    assert!(prefix.leftovers().is_empty());
    assert!(occupied.join("keep").is_file());
    assert!(prefix.bin_dir().join(LOCK_FILE_NAME).is_file());
}
