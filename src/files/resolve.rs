//! Request path to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Index files tried, in order, for extensionless request paths.
pub const DEFAULT_INDEX_FILES: [&str; 4] = ["index.html", "index.htm", "default.html", "default.htm"];

/// Opt-in header allowing filenames that literally end in `?query`.
pub const EXPANDED_PATH_HEADER: &str = "X-Expanded-File-Path";

/// Only plain relative components are allowed below the root.
fn is_contained(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Find an existing file for `relative` under `root`, preferring the
/// percent-decoded spelling over the raw one.
async fn existing(root: &Path, relative: &str) -> Option<PathBuf> {
    // A borrowed result means nothing was encoded.
    if let Ok(Cow::Owned(decoded)) = urlencoding::decode(relative) {
        let candidate = root.join(&decoded);
        if is_contained(&decoded) && is_file(&candidate).await {
            return Some(candidate);
        }
    }

    let candidate = root.join(relative);
    if is_contained(relative) && is_file(&candidate).await {
        return Some(candidate);
    }
    None
}

/// Resolve `request_path` (and its query, if any) to a file under `root`.
///
/// In order:
/// 1. an extensionless path is treated as a directory and the first
///    existing index file inside it wins;
/// 2. with `expanded` set and a query present, `path?query` is tried as a
///    literal filename;
/// 3. the path itself.
///
/// When nothing exists the plain `root/path` candidate is returned and the
/// caller reports it as missing. `None` means the path tries to leave
/// `root`.
pub async fn resolve_file_path(
    root: &Path,
    request_path: &str,
    query: Option<&str>,
    expanded: bool,
    index_files: &[String],
) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');

    if Path::new(relative).extension().is_none() {
        let directory = relative.trim_end_matches('/');
        for index in index_files {
            let candidate = if directory.is_empty() {
                index.clone()
            } else {
                format!("{directory}/{index}")
            };
            if let Some(found) = existing(root, &candidate).await {
                return Some(found);
            }
        }
    }

    if expanded {
        if let Some(query) = query {
            if let Some(found) = existing(root, &format!("{relative}?{query}")).await {
                return Some(found);
            }
        }
    }

    if let Some(found) = existing(root, relative).await {
        return Some(found);
    }

    is_contained(relative).then(|| root.join(relative))
}
