mod common;

use report_bundle_core::manifest::Manifest;
use report_bundle_core::{create_bundle, verify_bundle, PackOptions, VerifyOptions};

fn packed() -> (common::Fixture, std::path::PathBuf) {
    let fx = common::report_tree();
    let out = fx.out("bundle.zip");
    create_bundle(&fx.index, &out, &PackOptions::default()).unwrap();
    (fx, out)
}

#[test]
fn any_flipped_byte_is_reported_against_its_entry() {
    let (fx, out) = packed();
    let names: Vec<String> = common::entry_names(&out)
        .into_iter()
        .filter(|n| !n.ends_with('/') && n != "manifest.json")
        .collect();
    assert_eq!(names.len(), 7);

    for target in &names {
        let tampered = fx.out("tampered.zip");
        common::rewrite_zip(&out, &tampered, |name, mut bytes| {
            if name == target {
                let mid = bytes.len() / 2;
                bytes[mid] ^= 0x01;
            }
            Some(bytes)
        });

        let opts = VerifyOptions::default().with_index(false);
        let report = verify_bundle(&tampered, &opts).unwrap();
        assert!(!report.ok, "tamper of {} not detected", target);
        assert_eq!(report.mismatches, vec![target.clone()]);
        assert!(report
            .log
            .iter()
            .any(|l| l.starts_with("ERROR: ") && l.contains(target.as_str())));
    }
}

#[test]
fn all_mismatches_are_reported_in_one_pass() {
    let (fx, out) = packed();
    let tampered = fx.out("tampered.zip");
    common::rewrite_zip(&out, &tampered, |name, mut bytes| {
        match name {
            "dashboard.html" => bytes.push(b'\n'),
            "r1/plot.png" => bytes[0] ^= 0xff,
            _ => {}
        }
        Some(bytes)
    });

    let report = verify_bundle(&tampered, &VerifyOptions::default()).unwrap();
    assert!(!report.ok);
    assert_eq!(report.mismatches, vec!["dashboard.html", "r1/plot.png"]);
    assert!(report
        .log
        .iter()
        .any(|l| l.contains("size mismatch for dashboard.html")));
    assert!(report
        .log
        .iter()
        .any(|l| l.contains("sha256 mismatch for r1/plot.png")));
    assert_eq!(report.entries_checked, 7);
}

#[test]
fn entry_missing_from_archive_is_a_hash_failure() {
    let (fx, out) = packed();
    let stripped = fx.out("stripped.zip");
    common::rewrite_zip(&out, &stripped, |name, bytes| {
        (name != "static/app.css").then_some(bytes)
    });

    let report = verify_bundle(&stripped, &VerifyOptions::default()).unwrap();
    assert!(!report.ok);
    assert_eq!(report.mismatches, vec!["static/app.css"]);
}

#[test]
fn uppercase_recorded_hashes_still_match() {
    let (fx, out) = packed();
    let edited = fx.out("upper.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        if name != "manifest.json" {
            return Some(bytes);
        }
        let mut m = Manifest::from_slice(&bytes).unwrap();
        for f in &mut m.files {
            f.sha256 = f.sha256.to_ascii_uppercase();
        }
        Some(m.to_json_bytes().unwrap())
    });
    assert!(verify_bundle(&edited, &VerifyOptions::default()).unwrap().ok);
}

#[test]
fn inconsistent_file_count_fails() {
    let (fx, out) = packed();
    let edited = fx.out("count.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        if name != "manifest.json" {
            return Some(bytes);
        }
        let mut m = Manifest::from_slice(&bytes).unwrap();
        m.file_count += 1;
        Some(m.to_json_bytes().unwrap())
    });
    let report = verify_bundle(&edited, &VerifyOptions::default()).unwrap();
    assert!(!report.ok);
    assert!(report.mismatches.is_empty());
    assert!(report.log.iter().any(|l| l.contains("file_count")));
}

#[test]
fn corrupt_manifest_fails_hash_check() {
    let (fx, out) = packed();
    let edited = fx.out("corrupt.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        if name == "manifest.json" {
            Some(b"{not json".to_vec())
        } else {
            Some(bytes)
        }
    });
    let report = verify_bundle(&edited, &VerifyOptions::default()).unwrap();
    assert!(!report.ok);
    assert!(report.log.iter().any(|l| l.contains("manifest manifest.json unreadable")));
}

#[test]
fn corrupted_compressed_data_is_reported_against_its_entry() {
    let (fx, out) = packed();
    let damaged = fx.out("damaged.zip");
    std::fs::copy(&out, &damaged).unwrap();
    common::corrupt_stored_bytes(&damaged, "r1/report.html");

    let report = verify_bundle(&damaged, &VerifyOptions::default()).unwrap();
    assert!(!report.ok);
    assert_eq!(report.mismatches, vec!["r1/report.html"]);
    assert!(report
        .log
        .iter()
        .any(|l| l.starts_with("ERROR: ") && l.contains("r1/report.html")));
}
