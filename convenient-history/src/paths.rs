//! Path helpers for storing source locations relative to the output directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    let _ = out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonical form of `path`, falling back to a normalized absolute path when
/// it does not exist.
///
/// For a missing file the deepest existing ancestor is still canonicalized,
/// so a path below a symlinked directory compares equal to the canonical
/// path of the same location once the file reappears.
#[must_use]
pub fn canonical_or_absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    let absolute = normalize(&std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()));
    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    while let Some(parent) = current.parent() {
        if let Some(name) = current.file_name() {
            tail.push(name.to_os_string());
        }
        if let Ok(mut base) = fs::canonicalize(parent) {
            for name in tail.iter().rev() {
                base.push(name);
            }
            return base;
        }
        current = parent;
    }
    absolute
}

/// Path of `target` relative to the directory `base`.
///
/// `base` is expected to be canonical already. When the two paths share
/// nothing but the filesystem root, the canonical absolute path of `target`
/// is returned instead of a chain of `..` components.
#[must_use]
pub fn relative_path(base: &Path, target: &Path) -> String {
    let target = canonical_or_absolute(target);
    let base_components: Vec<Component<'_>> = base.components().collect();
    let target_components: Vec<Component<'_>> = target.components().collect();

    let common = base_components
        .iter()
        .zip(&target_components)
        .take_while(|(a, b)| a == b)
        .count();

    let shares_directory = base_components[..common]
        .iter()
        .any(|c| matches!(c, Component::Normal(_)));
    if !shares_directory {
        return target.to_string_lossy().into_owned();
    }

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        ".".to_string()
    } else {
        relative.to_string_lossy().into_owned()
    }
}
