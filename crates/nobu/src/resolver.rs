//! Bare module resolution.
//!
//! `/@modules/<package>` is answered with the file named by the `module`
//! field of `<modules dir>/<package>/package.json`. There is exactly one
//! level of indirection through the manifest: no `exports` map, no
//! conditional exports, no version resolution.
//!
//! A specifier with a sub-path names either a file inside the package
//! (`lodash-es/debounce`, `debounce.js` on disk) or a nested directory
//! with its own manifest (`vue/server-renderer`).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::paths::safe_join;
use crate::request::MODULES_PREFIX;
use crate::rewrite::rewrite_imports;
use crate::runtime::{read_text, Runtime};
use crate::{Error, Result};

/// Name of the package manifest file.
pub const MANIFEST_FILE: &str = "package.json";

/// Extensions tried for a sub-path that names no file as written.
const SUBPATH_EXTENSIONS: [&str; 2] = [".js", ".mjs"];

/// Maximum allowed size for package.json files (10MB)
const MAX_MANIFEST_SIZE: u64 = 10 * 1024 * 1024;

/// The subset of package.json the resolver needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Package name
    pub name: Option<String>,
    /// ES module entry, relative to the package directory
    pub module: Option<String>,
}

/// Split a bare specifier into package name and optional sub-path.
///
/// `@scope/pkg/sub` → (`@scope/pkg`, `Some("sub")`), `pkg` → (`pkg`, `None`).
pub fn split_specifier(specifier: &str) -> (&str, Option<&str>) {
    let split_at = if specifier.starts_with('@') {
        specifier.match_indices('/').nth(1).map(|(i, _)| i)
    } else {
        specifier.find('/')
    };

    match split_at {
        Some(i) => {
            let subpath = specifier[i + 1..].trim_matches('/');
            (&specifier[..i], (!subpath.is_empty()).then_some(subpath))
        }
        None => (specifier, None),
    }
}

/// Locates and loads packages from the dependency root.
#[derive(Debug, Clone)]
pub struct BareModuleResolver {
    runtime: Arc<dyn Runtime>,
    modules_dir: PathBuf,
}

impl BareModuleResolver {
    /// Create a resolver reading packages from `modules_dir`.
    pub fn new(runtime: Arc<dyn Runtime>, modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            modules_dir: modules_dir.into(),
        }
    }

    /// Directory packages are resolved from.
    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    /// Resolve a bare specifier to the file it names on disk.
    ///
    /// A sub-path is served as a file when one exists, trying the `.js`
    /// and `.mjs` extensions after the exact name. Otherwise it is a
    /// directory with its own manifest, like `vue/server-renderer`.
    pub async fn resolve_entry(&self, specifier: &str) -> Result<PathBuf> {
        let (package, subpath) = split_specifier(specifier);
        if package.is_empty() || package == "@" {
            return Err(Error::UnroutableRequest(format!("{MODULES_PREFIX}{specifier}")));
        }

        let mut dir = safe_join(&self.modules_dir, package)?;

        if let Some(subpath) = subpath {
            let target = safe_join(&dir, subpath)?;
            if let Some(file) = self.find_file(&target).await {
                return Ok(file);
            }
            dir = target;
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest = self.read_manifest(specifier, &manifest_path).await?;

        let entry = manifest
            .module
            .filter(|entry| !entry.trim().is_empty())
            .ok_or_else(|| Error::ManifestFieldMissing {
                package: specifier.to_string(),
                path: manifest_path.clone(),
            })?;

        safe_join(&dir, &entry)
    }

    /// The file `target` names, exactly or with a script extension.
    async fn find_file(&self, target: &Path) -> Option<PathBuf> {
        let mut candidates = vec![target.to_path_buf()];
        for extension in SUBPATH_EXTENSIONS {
            let mut name = target.as_os_str().to_os_string();
            name.push(extension);
            candidates.push(PathBuf::from(name));
        }

        for candidate in candidates {
            if let Ok(metadata) = self.runtime.metadata(&candidate).await {
                if metadata.is_file {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Resolve a bare specifier and return its source with imports rewritten.
    ///
    /// The package's own imports may be bare as well; the browser follows
    /// them back to `/@modules/`.
    pub async fn load(&self, specifier: &str) -> Result<String> {
        let entry = self.resolve_entry(specifier).await?;
        tracing::debug!(specifier, entry = %entry.display(), "resolved bare module");

        let source = read_text(self.runtime.as_ref(), &entry).await?;
        Ok(rewrite_imports(&source).into_owned())
    }

    async fn read_manifest(&self, package: &str, path: &Path) -> Result<PackageManifest> {
        let not_found = || Error::ManifestNotFound {
            package: package.to_string(),
            path: path.to_path_buf(),
        };

        let metadata = self.runtime.metadata(path).await.map_err(|e| match e {
            crate::RuntimeError::FileNotFound(_) => not_found(),
            other => other.into(),
        })?;

        if !metadata.is_file {
            return Err(not_found());
        }

        if metadata.size > MAX_MANIFEST_SIZE {
            return Err(Error::InvalidManifest {
                package: package.to_string(),
                reason: format!(
                    "package.json exceeds maximum size of {}MB",
                    MAX_MANIFEST_SIZE / 1024 / 1024
                ),
            });
        }

        let content = read_text(self.runtime.as_ref(), path)
            .await
            .map_err(|e| match e {
                Error::FileNotFound(_) => not_found(),
                other => other,
            })?;

        serde_json::from_str(&content).map_err(|e| Error::InvalidManifest {
            package: package.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NativeRuntime;
    use std::fs;
    use tempfile::TempDir;

    fn write_package(root: &Path, name: &str, manifest: &str, files: &[(&str, &str)]) {
        let dir = root.join("node_modules").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), manifest).unwrap();
        for (file, content) in files {
            let path = dir.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn resolver(root: &Path) -> BareModuleResolver {
        BareModuleResolver::new(Arc::new(NativeRuntime::new()), root.join("node_modules"))
    }

    #[test]
    fn test_split_specifier() {
        assert_eq!(split_specifier("vue"), ("vue", None));
        assert_eq!(split_specifier("lodash-es/debounce"), ("lodash-es", Some("debounce")));
        assert_eq!(split_specifier("@vue/shared"), ("@vue/shared", None));
        assert_eq!(
            split_specifier("@vue/runtime-dom/dist/x.js"),
            ("@vue/runtime-dom", Some("dist/x.js"))
        );
        assert_eq!(split_specifier("vue/"), ("vue", None));
    }

    #[tokio::test]
    async fn test_resolves_module_field() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "foo",
            r#"{ "name": "foo", "module": "dist/foo.esm.js" }"#,
            &[("dist/foo.esm.js", "export default 'foo'")],
        );

        let entry = resolver(temp.path()).resolve_entry("foo").await.unwrap();
        assert_eq!(entry, temp.path().join("node_modules/foo/dist/foo.esm.js"));
    }

    #[tokio::test]
    async fn test_load_rewrites_nested_bare_imports() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "@vue/runtime-dom",
            r#"{ "module": "./dist/runtime-dom.esm-bundler.js" }"#,
            &[(
                "dist/runtime-dom.esm-bundler.js",
                "import { h } from '@vue/runtime-core'\nimport { a } from './a.js'\n",
            )],
        );

        let source = resolver(temp.path()).load("@vue/runtime-dom").await.unwrap();
        assert!(source.contains("from '/@modules/@vue/runtime-core'"));
        assert!(source.contains("from './a.js'"));
    }

    #[tokio::test]
    async fn test_subpath_file() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "lodash-es",
            r#"{ "name": "lodash-es" }"#,
            &[
                ("debounce.js", "export default function debounce() {}"),
                ("throttle.mjs", "export default function throttle() {}"),
            ],
        );
        let resolver = resolver(temp.path());

        let source = resolver.load("lodash-es/debounce").await.unwrap();
        assert!(source.contains("function debounce"));

        let entry = resolver.resolve_entry("lodash-es/throttle").await.unwrap();
        assert_eq!(entry, temp.path().join("node_modules/lodash-es/throttle.mjs"));
    }

    #[tokio::test]
    async fn test_subpath_directory_manifest() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "vue",
            r#"{ "module": "dist/vue.esm.js" }"#,
            &[
                ("server-renderer/package.json", r#"{ "module": "dist/sr.esm.js" }"#),
                ("server-renderer/dist/sr.esm.js", "import { h } from 'vue'
"),
            ],
        );

        let source = resolver(temp.path()).load("vue/server-renderer").await.unwrap();
        assert_eq!(source, "import { h } from '/@modules/vue'\n");
    }

    #[tokio::test]
    async fn test_missing_subpath() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "vue", r#"{ "module": "index.js" }"#, &[]);

        let err = resolver(temp.path()).load("vue/nope").await.unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = resolver(temp.path()).load("nope").await.unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_missing_module_field() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "cjs-only", r#"{ "main": "index.js" }"#, &[]);

        let err = resolver(temp.path()).load("cjs-only").await.unwrap_err();
        assert!(matches!(err, Error::ManifestFieldMissing { .. }));
    }

    #[tokio::test]
    async fn test_missing_entry_file() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "ghost", r#"{ "module": "dist/ghost.js" }"#, &[]);

        let err = resolver(temp.path()).load("ghost").await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_manifest() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "broken", "{ not json", &[]);

        let err = resolver(temp.path()).load("broken").await.unwrap_err();
        assert!(matches!(err, Error::InvalidManifest { .. }));
    }

    #[tokio::test]
    async fn test_entry_cannot_escape_package() {
        let temp = TempDir::new().unwrap();
        write_package(temp.path(), "evil", r#"{ "module": "../../secret.js" }"#, &[]);

        let err = resolver(temp.path()).load("evil").await.unwrap_err();
        assert!(matches!(err, Error::PathTraversal(_)));
    }

    #[tokio::test]
    async fn test_empty_specifier() {
        let temp = TempDir::new().unwrap();
        let err = resolver(temp.path()).load("").await.unwrap_err();
        assert!(matches!(err, Error::UnroutableRequest(_)));
    }
}
