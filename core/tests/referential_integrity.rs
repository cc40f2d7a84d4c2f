mod common;

use report_bundle_core::{create_bundle, verify_bundle, PackOptions, VerifyOptions};

fn index_only() -> VerifyOptions {
    VerifyOptions::default().with_hashes(false)
}

fn packed(opts: &PackOptions) -> (common::Fixture, std::path::PathBuf) {
    let fx = common::report_tree();
    let out = fx.out("bundle.zip");
    create_bundle(&fx.index, &out, opts).unwrap();
    (fx, out)
}

#[test]
fn missing_ok_report_fails_index_check() {
    let (fx, out) = packed(&PackOptions::default());
    let edited = fx.out("edited.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        (name != "r1/report.html").then_some(bytes)
    });

    let report = verify_bundle(&edited, &index_only()).unwrap();
    assert!(!report.ok);
    assert!(report
        .log
        .iter()
        .any(|l| l.starts_with("ERROR: ") && l.contains("report r1/report.html missing")));
}

#[test]
fn missing_skipped_report_fails_index_check() {
    let (fx, out) = packed(&PackOptions::default());
    let edited = fx.out("edited.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        (name != "r2/report.html").then_some(bytes)
    });
    assert!(!verify_bundle(&edited, &index_only()).unwrap().ok);
}

#[test]
fn missing_dashboard_fails_index_check() {
    let (fx, out) = packed(&PackOptions::default());
    let edited = fx.out("edited.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        (name != "dashboard.html").then_some(bytes)
    });
    let report = verify_bundle(&edited, &index_only()).unwrap();
    assert!(!report.ok);
    assert!(report.log.iter().any(|l| l.contains("dashboard dashboard.html missing")));
}

#[test]
fn missing_failed_report_is_tolerated() {
    let (fx, out) = packed(&PackOptions::default());
    let edited = fx.out("edited.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        (name != "r4/report.html").then_some(bytes)
    });

    let report = verify_bundle(&edited, &index_only()).unwrap();
    assert!(report.ok, "{:#?}", report.log);
    assert!(report
        .log
        .iter()
        .any(|l| l.starts_with("INFO: ") && l.contains("r4/report.html")));
}

#[test]
fn index_is_found_without_a_manifest() {
    let (_fx, out) = packed(&PackOptions::default().with_manifest(false));
    let report = verify_bundle(&out, &index_only()).unwrap();
    assert!(report.ok, "{:#?}", report.log);
}

#[test]
fn explicit_index_name_is_used() {
    let (fx, out) = packed(&PackOptions::default().with_manifest(false));
    let renamed = fx.out("renamed.zip");
    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
    common::rewrite_zip(&out, &fx.out("scratch.zip"), |name, bytes| {
        let name = if name == "index.json" { "bundle_index.json" } else { name };
        entries.push((name.to_string(), bytes.clone()));
        Some(bytes)
    });
    let raw: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(n, b)| (n.as_str(), b.as_slice()))
        .collect();
    common::raw_zip(&renamed, &raw);

    let hinted = index_only().with_index_name("bundle_index.json");
    let report = verify_bundle(&renamed, &hinted).unwrap();
    assert!(report.ok, "{:#?}", report.log);
}

#[test]
fn archive_without_any_index_fails_requested_check() {
    let tmp = tempfile::tempdir().unwrap();
    let zip = tmp.path().join("bare.zip");
    common::raw_zip(&zip, &[("notes.txt", &b"hello"[..])]);

    let report = verify_bundle(&zip, &index_only()).unwrap();
    assert!(!report.ok);
    assert!(report.log.iter().any(|l| l.contains("no index document")));

    let nothing = index_only().with_index(false);
    assert!(verify_bundle(&zip, &nothing).unwrap().ok);
}

#[test]
fn reference_climbing_out_of_archive_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let zip = tmp.path().join("climb.zip");
    let index = br#"{"dashboard_html": "../dashboard.html", "reports": []}"#;
    common::raw_zip(&zip, &[("index.json", &index[..])]);

    let report = verify_bundle(&zip, &index_only()).unwrap();
    assert!(!report.ok);
    assert!(report.log.iter().any(|l| l.contains("climbs above the archive root")));
}

#[test]
fn nested_index_resolves_relative_to_its_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let zip = tmp.path().join("nested.zip");
    let index = br#"{"dashboard_html": "dashboard.html",
        "reports": [{"outdir": "r1", "report_html": "r1/report.html", "status": "ok"}]}"#;
    common::raw_zip(
        &zip,
        &[
            ("run/index.json", &index[..]),
            ("run/dashboard.html", &b"<html></html>"[..]),
            ("run/r1/report.html", &b"<html></html>"[..]),
        ],
    );

    let hinted = index_only().with_index_name("run/index.json");
    let report = verify_bundle(&zip, &hinted).unwrap();
    assert!(report.ok, "{:#?}", report.log);
}

#[test]
fn unreadable_manifest_only_warns_when_hashes_are_not_checked() {
    let (fx, out) = packed(&PackOptions::default());
    let edited = fx.out("edited.zip");
    common::rewrite_zip(&out, &edited, |name, bytes| {
        if name == "manifest.json" {
            Some(b"{truncated".to_vec())
        } else {
            Some(bytes)
        }
    });

    let report = verify_bundle(&edited, &index_only()).unwrap();
    assert!(report.ok, "{:#?}", report.log);
    assert!(report
        .log
        .iter()
        .any(|l| l.starts_with("WARN: ") && l.contains("manifest manifest.json unreadable")));

    let full = verify_bundle(&edited, &VerifyOptions::default()).unwrap();
    assert!(!full.ok);
}
