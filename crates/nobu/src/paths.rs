//! Joining untrusted URL segments onto trusted directories.
//!
//! Request paths and package names come straight from the browser, so every
//! filesystem path derived from them is built with [`safe_join`].

use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Join an untrusted, `/`-separated path onto `base`.
///
/// Leading slashes are ignored, so `/src/main.js` lands at
/// `base/src/main.js`. The join is rejected with [`Error::PathTraversal`]
/// when any segment is `..`, contains a NUL byte, or is not a plain file
/// name on this platform (drive prefixes, root components).
pub fn safe_join(base: &Path, untrusted: &str) -> Result<PathBuf> {
    let reject = || Error::PathTraversal(untrusted.to_string());

    if untrusted.contains('\0') {
        return Err(reject());
    }

    let mut joined = base.to_path_buf();
    for segment in untrusted.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(reject()),
            segment => {
                let plain = Path::new(segment)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
                if !plain {
                    return Err(reject());
                }
                joined.push(segment);
            }
        }
    }

    let joined = joined.clean();
    let base = base.to_path_buf().clean();
    if base != Path::new(".") && !joined.starts_with(&base) {
        return Err(reject());
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_request_paths() {
        let base = Path::new("/srv/app");
        assert_eq!(
            safe_join(base, "/src/main.js").unwrap(),
            PathBuf::from("/srv/app/src/main.js")
        );
        assert_eq!(
            safe_join(base, "src/./App.vue").unwrap(),
            PathBuf::from("/srv/app/src/App.vue")
        );
        assert_eq!(
            safe_join(base, "@vue/shared").unwrap(),
            PathBuf::from("/srv/app/@vue/shared")
        );
    }

    #[test]
    fn test_empty_path_is_base() {
        let base = Path::new("/srv/app");
        assert_eq!(safe_join(base, "/").unwrap(), PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_rejects_parent_segments() {
        let base = Path::new("/srv/app");
        assert!(matches!(
            safe_join(base, "/../etc/passwd"),
            Err(Error::PathTraversal(_))
        ));
        assert!(safe_join(base, "/src/../../secret").is_err());
        assert!(safe_join(base, "..\\windows").is_err());
    }

    #[test]
    fn test_rejects_nul_bytes() {
        assert!(safe_join(Path::new("/srv/app"), "/main.js\0.png").is_err());
    }

    #[test]
    fn test_current_dir_base() {
        assert_eq!(
            safe_join(Path::new("."), "/src/main.js").unwrap(),
            PathBuf::from("src/main.js")
        );
        assert!(safe_join(Path::new("."), "/../main.js").is_err());
    }

    #[test]
    fn test_relative_base() {
        assert_eq!(
            safe_join(Path::new("node_modules"), "vue").unwrap(),
            PathBuf::from("node_modules/vue")
        );
    }
}
