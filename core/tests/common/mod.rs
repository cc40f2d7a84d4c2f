#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::ZipArchive;

pub struct Fixture {
    pub _tmp: tempfile::TempDir,
    pub root: PathBuf,
    pub base: PathBuf,
    pub index: PathBuf,
}

impl Fixture {
    pub fn out(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Report tree as the external reporting step leaves it:
///
/// - r1 `ok` with a plot image and a link escaping the base directory
/// - r2 `skipped` with a placeholder page
/// - r3 `error` without any output
/// - r4 `error` with partial output
pub fn report_tree() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    let base = root.join("run");
    for d in ["r1", "r2", "r4", "static"] {
        fs::create_dir_all(base.join(d)).unwrap();
    }
    fs::write(root.join("secret.txt"), b"do not ship").unwrap();

    fs::write(
        base.join("dashboard.html"),
        r##"<html><head><link rel="stylesheet" href="static/app.css"></head>
<body><a href="r1/report.html">r1</a><a href="https://example.com/docs">docs</a>
<a href="#top">top</a></body></html>"##,
    )
    .unwrap();
    fs::write(base.join("static/app.css"), b"body { margin: 0 }").unwrap();
    fs::write(
        base.join("r1/report.html"),
        r#"<html><body><img src="plot.png?v=1"><link href="../static/app.css">
<a href="../../secret.txt">secret</a></body></html>"#,
    )
    .unwrap();
    fs::write(base.join("r1/plot.png"), [0x89u8, b'P', b'N', b'G', 0, 1, 2, 3]).unwrap();
    fs::write(base.join("r2/report.html"), b"<html><body>skipped</body></html>").unwrap();
    fs::write(base.join("r4/report.html"), b"<html><body>partial").unwrap();

    let index = base.join("index.json");
    write_index(
        &index,
        "dashboard.html",
        &[
            ("r1", "r1/report.html", "ok"),
            ("r2", "r2/report.html", "skipped"),
            ("r3", "r3/report.html", "error"),
            ("r4", "r4/report.html", "error"),
        ],
    );

    Fixture {
        _tmp: tmp,
        root,
        base,
        index,
    }
}

pub fn write_index(path: &Path, dashboard: &str, reports: &[(&str, &str, &str)]) {
    let reports: Vec<serde_json::Value> = reports
        .iter()
        .map(|(outdir, html, status)| {
            serde_json::json!({"outdir": outdir, "report_html": html, "status": status})
        })
        .collect();
    let doc = serde_json::json!({"dashboard_html": dashboard, "reports": reports});
    fs::write(path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
}

pub fn entry_names(zip_path: &Path) -> Vec<String> {
    let mut zip = ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

pub fn read_entry(zip_path: &Path, name: &str) -> Vec<u8> {
    let mut zip = ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    let mut f = zip.by_name(name).unwrap();
    let mut out = Vec::new();
    f.read_to_end(&mut out).unwrap();
    out
}

/// Copies `src` to `dst`, letting `edit` replace (Some) or drop (None) each
/// file entry's bytes. Directory entries are copied as-is.
pub fn rewrite_zip<F>(src: &Path, dst: &Path, mut edit: F)
where
    F: FnMut(&str, Vec<u8>) -> Option<Vec<u8>>,
{
    let mut zin = ZipArchive::new(File::open(src).unwrap()).unwrap();
    let mut zw = ZipWriter::new(File::create(dst).unwrap());
    let opts = SimpleFileOptions::default();
    for i in 0..zin.len() {
        let mut f = zin.by_index(i).unwrap();
        let name = f.name().to_string();
        if f.is_dir() {
            zw.add_directory(name, opts).unwrap();
            continue;
        }
        let mut bytes = Vec::new();
        f.read_to_end(&mut bytes).unwrap();
        if let Some(bytes) = edit(&name, bytes) {
            zw.start_file(name, opts).unwrap();
            zw.write_all(&bytes).unwrap();
        }
    }
    zw.finish().unwrap();
}

/// Writes a zip whose entries carry the given raw names, unvalidated.
pub fn raw_zip(dst: &Path, entries: &[(&str, &[u8])]) {
    let mut zw = ZipWriter::new(File::create(dst).unwrap());
    let opts = SimpleFileOptions::default();
    for (name, bytes) in entries {
        zw.start_file(*name, opts).unwrap();
        zw.write_all(bytes).unwrap();
    }
    zw.finish().unwrap();
}

/// Flips one byte inside the stored (compressed) data of entry `name`,
/// leaving every header untouched.
pub fn corrupt_stored_bytes(zip_path: &Path, name: &str) {
    let (start, len) = {
        let mut zip = ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
        let f = zip.by_name(name).unwrap();
        (f.data_start(), f.compressed_size())
    };
    assert!(len > 2, "{} has no stored data to corrupt", name);
    let mut bytes = fs::read(zip_path).unwrap();
    let at = (start + len / 2) as usize;
    bytes[at] ^= 0xff;
    fs::write(zip_path, bytes).unwrap();
}
