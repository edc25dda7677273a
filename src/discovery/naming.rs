//! Destination document names

use std::path::{Component, Path, PathBuf};

/// Label used for files outside every source root
pub const FALLBACK_LABEL: &str = "files";

/// Build the destination name for `file`.
///
/// The longest root containing the file becomes the base and the name is
/// `<root-name>/<relative/path>` with forward slashes. Files under no root get
/// `files/<filename>`. Both `file` and `roots` are expected to be resolved
/// paths; no filesystem access happens here.
pub fn document_name(file: &Path, roots: &[PathBuf]) -> String {
    let best = roots
        .iter()
        .filter_map(|root| file.strip_prefix(root).ok().map(|rel| (root, rel)))
        .filter(|(_, rel)| rel.components().next().is_some())
        .max_by_key(|(root, _)| root.components().count());

    match best {
        Some((root, relative)) => {
            let label = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| FALLBACK_LABEL.to_string());
            format!("{}/{}", label, to_posix(relative))
        }
        None => {
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}/{}", FALLBACK_LABEL, filename)
        }
    }
}

/// Join path components with forward slashes regardless of platform
fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
