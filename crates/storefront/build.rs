//! Build script for storefront crate.
//!
//! Fingerprints the stylesheet and the toast script so templates can link
//! immutable, cache-busted copies.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Assets to fingerprint: (path under `static/`, extension, env var).
const ASSETS: &[(&str, &str, &str)] = &[
    ("css/main.css", "css", "CSS_HASH"),
    ("js/app.js", "js", "JS_HASH"),
];

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set");
        return;
    };
    let static_dir = Path::new(&manifest_dir).join("static");

    for (relative, ext, var) in ASSETS {
        let hash = match hash_asset(&static_dir, relative, ext) {
            Ok(hash) => hash,
            Err(e) => {
                println!("cargo:warning=Could not fingerprint {relative}: {e}");
                String::new()
            }
        };
        println!("cargo:rustc-env={var}={hash}");
    }
}

/// Hash an asset and copy it to `derived/` beside it as `<stem>.<hash>.<ext>`.
///
/// Returns the first 8 hex chars of the SHA-256 digest.
fn hash_asset(static_dir: &Path, relative: &str, ext: &str) -> std::io::Result<String> {
    let source = static_dir.join(relative);
    println!("cargo:rerun-if-changed={}", source.display());

    let content = fs::read(&source)?;
    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash = digest.get(..8).unwrap_or(&digest).to_string();

    let parent = source.parent().unwrap_or(static_dir);
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset");
    let derived_dir = parent.join("derived");
    fs::create_dir_all(&derived_dir)?;
    fs::copy(&source, derived_dir.join(format!("{stem}.{short_hash}.{ext}")))?;

    Ok(short_hash)
}
