//! Fingerprint output in text and JSON form.

use addon_fingerprint_core::{collect_addons, AddonSet, Config, FINGERPRINT_SCHEMA_VERSION};
use miette::Result;
use serde::Serialize;
use tracing::info;

/// Exit code for a failed computation in JSON mode.
const EXIT_ERROR: i32 = 1;

/// Result for JSON output.
#[derive(Serialize)]
struct FingerprintResult<'a> {
    schema_version: u32,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    addons: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FingerprintError>,
}

/// Error info for JSON output.
#[derive(Serialize)]
struct FingerprintError {
    code: &'static str,
    message: String,
}

/// Compute and print the fingerprint for `config.cwd`.
///
/// Prints an empty fingerprint when no project manifest is found.
pub fn run(config: &Config, list: bool, json: bool) -> Result<()> {
    let set = match collect_addons(&config.cwd) {
        Ok(set) => set,
        Err(err) => {
            if json {
                print_json(&FingerprintResult {
                    schema_version: FINGERPRINT_SCHEMA_VERSION,
                    ok: false,
                    root: None,
                    fingerprint: None,
                    addons: None,
                    error: Some(FingerprintError {
                        code: err.code(),
                        message: err.to_string(),
                    }),
                });
                std::process::exit(EXIT_ERROR);
            }
            return Err(miette::miette!("{err}"));
        }
    };

    if set.is_none() {
        info!(cwd = %config.cwd.display(), "No package.json found");
    }

    if json {
        print_json(&success(set.as_ref()));
        return Ok(());
    }

    match &set {
        Some(set) => {
            println!("{}", set.fingerprint);
            if list {
                for addon in &set.addons {
                    println!("{addon}");
                }
            }
        }
        None => println!(),
    }

    Ok(())
}

fn success(set: Option<&AddonSet>) -> FingerprintResult<'_> {
    FingerprintResult {
        schema_version: FINGERPRINT_SCHEMA_VERSION,
        ok: true,
        root: set.map(|s| s.root.to_string_lossy().into_owned()),
        fingerprint: Some(set.map_or("", |s| s.fingerprint.as_str())),
        addons: Some(set.map_or(&[][..], |s| s.addons.as_slice())),
        error: None,
    }
}

fn print_json(result: &FingerprintResult<'_>) {
    match serde_json::to_string(result) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("error: failed to serialize output: {e}"),
    }
}
