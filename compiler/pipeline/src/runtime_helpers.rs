//! Runtime helper modules imported by generated collections.
//!
//! The sources are embedded at compile time and copied into the run's helper
//! directory only when at least one generated file imports them.

use std::path::{Component, Path, PathBuf};

use codegen::HelperUse;

/// Name of the helper directory beside the generated modules.
pub const HELPER_DIR_NAME: &str = "keys";

/// `KeyHasher` source.
pub const HASHER_SOURCE: &str = include_str!("../runtime/keys/Hasher.mjs");

/// `WeakKeyComposer` source. Imports `./Hasher.mjs`.
pub const COMPOSITE_SOURCE: &str = include_str!("../runtime/keys/Composite.mjs");

/// File names and sources needed to satisfy `helpers`.
pub fn required_files(helpers: HelperUse) -> Vec<(&'static str, &'static str)> {
    let mut files = Vec::new();
    // The composer imports the hasher.
    if helpers.hasher || helpers.composer {
        files.push(("Hasher.mjs", HASHER_SOURCE));
    }
    if helpers.composer {
        files.push(("Composite.mjs", COMPOSITE_SOURCE));
    }
    files
}

/// Writes the helpers `helpers` asks for into `dir`, returning the written paths.
pub async fn copy_helpers(dir: &Path, helpers: HelperUse) -> std::io::Result<Vec<PathBuf>> {
    let files = required_files(helpers);
    if files.is_empty() {
        return Ok(Vec::new());
    }

    tokio::fs::create_dir_all(dir).await?;
    let mut written = Vec::with_capacity(files.len());
    for (name, source) in files {
        let path = dir.join(name);
        tokio::fs::write(&path, source).await?;
        logging::debug("pipeline", &format!("copied runtime helper {}", path.display()));
        written.push(path);
    }
    Ok(written)
}

/// Import specifier prefix from `output_file` to `helper_dir`, e.g. `./keys`
/// or `../keys`.
pub fn import_prefix(output_file: &Path, helper_dir: &Path) -> String {
    let from = output_file.parent().unwrap_or_else(|| Path::new(""));
    let relative = pathdiff::diff_paths(helper_dir, from).unwrap_or_else(|| helper_dir.into());

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::ParentDir => Some("..".to_string()),
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    match parts.first().map(String::as_str) {
        None => ".".to_string(),
        Some("..") => parts.join("/"),
        Some(_) => format!("./{}", parts.join("/")),
    }
}
