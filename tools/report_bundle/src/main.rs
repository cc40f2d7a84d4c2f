use report_bundle_core::{
    create_bundle, extract_with_options, verify_bundle, ExtractOptions, PackOptions,
    VerifyOptions,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage:
  report_bundle pack <index.json> <out.zip> [--no-assets] [--no-manifest] [--schema]
                     [--schema-file <path>] [--manifest-name <name>]
  report_bundle verify <bundle.zip> [--no-hashes] [--no-index]
                     [--manifest-name <name>] [--index-name <name>]
  report_bundle extract <bundle.zip> <out_dir> [--overwrite]";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let code = match args.first().map(String::as_str) {
        Some("pack") => pack(&args[1..]),
        Some("verify") => verify(&args[1..]),
        Some("extract") => extract(&args[1..]),
        _ => usage(),
    };
    std::process::exit(code);
}

fn usage() -> i32 {
    eprintln!("{}", USAGE);
    2
}

/// Splits positionals from `--flag` / `--flag value` options.
fn split_args<'a>(
    args: &'a [String],
    valued: &[&str],
) -> Result<(Vec<&'a str>, Vec<(&'a str, Option<&'a str>)>), String> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a.starts_with("--") {
            if valued.contains(&a.as_str()) {
                let v = it.next().ok_or_else(|| format!("{} needs a value", a))?;
                flags.push((a.as_str(), Some(v.as_str())));
            } else {
                flags.push((a.as_str(), None));
            }
        } else {
            positional.push(a.as_str());
        }
    }
    Ok((positional, flags))
}

fn pack(args: &[String]) -> i32 {
    let (pos, flags) = match split_args(args, &["--schema-file", "--manifest-name"]) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            return usage();
        }
    };
    if pos.len() != 2 {
        return usage();
    }
    let mut opts = PackOptions::default();
    for (flag, value) in flags {
        opts = match (flag, value) {
            ("--no-assets", None) => opts.with_assets(false),
            ("--no-manifest", None) => opts.with_manifest(false),
            ("--schema", None) => opts.with_schema(true),
            ("--schema-file", Some(v)) => opts.with_schema(true).with_schema_source(v),
            ("--manifest-name", Some(v)) => opts.with_manifest_name(v),
            (other, _) => {
                eprintln!("unknown option {}", other);
                return usage();
            }
        };
    }

    match create_bundle(Path::new(pos[0]), Path::new(pos[1]), &opts) {
        Ok(outcome) => {
            for line in &outcome.log {
                println!("{}", line);
            }
            0
        }
        Err(e) => {
            eprintln!("pack failed: {}", e);
            1
        }
    }
}

fn verify(args: &[String]) -> i32 {
    let (pos, flags) = match split_args(args, &["--manifest-name", "--index-name"]) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            return usage();
        }
    };
    if pos.len() != 1 {
        return usage();
    }
    let mut opts = VerifyOptions::default();
    for (flag, value) in flags {
        opts = match (flag, value) {
            ("--no-hashes", None) => opts.with_hashes(false),
            ("--no-index", None) => opts.with_index(false),
            ("--manifest-name", Some(v)) => opts.with_manifest_name(v),
            ("--index-name", Some(v)) => opts.with_index_name(v),
            (other, _) => {
                eprintln!("unknown option {}", other);
                return usage();
            }
        };
    }

    match verify_bundle(Path::new(pos[0]), &opts) {
        Ok(report) => {
            for line in &report.log {
                println!("{}", line);
            }
            if report.ok {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("verify failed: {}", e);
            1
        }
    }
}

fn extract(args: &[String]) -> i32 {
    let (pos, flags) = match split_args(args, &[]) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            return usage();
        }
    };
    if pos.len() != 2 {
        return usage();
    }
    let mut opts = ExtractOptions::default();
    for (flag, _) in flags {
        match flag {
            "--overwrite" => opts = opts.with_overwrite(true),
            other => {
                eprintln!("unknown option {}", other);
                return usage();
            }
        }
    }

    match extract_with_options(Path::new(pos[0]), Path::new(pos[1]), &opts) {
        Ok(outcome) => {
            println!(
                "INFO: extracted {} files, {} directories ({} bytes) to {}",
                outcome.files_written, outcome.dirs_created, outcome.bytes_written, pos[1]
            );
            0
        }
        Err(e) => {
            eprintln!("extract failed: {}", e);
            1
        }
    }
}
