use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The caller's `Cargo.toml`, used to find how a workspace crate is named
/// from the crate that invokes a derive.
///
/// Generated code must name `dg_record` items with a path that resolves in
/// the invoking crate. A user may depend on `dg_record` directly, or only on
/// the `dg_core` facade, or on the facade renamed to `defgraph`.
///
/// # Example
///
/// ```rust
/// # use dg_macro_utils::Manifest;
/// let p: syn::Path = Manifest::shared(|m| m.get_crate_path("dg_record"));
/// ```
///
/// # Resolution rules
///
/// 1. The crate itself is listed in `dependencies`: `::dg_record`.
/// 2. The name starts with `dg_` and the facade is listed under one of
///    `defgraph`, `dg_core`, `dg`: `::<facade>::record`.
/// 3. Steps 1-2 again for `dev-dependencies`.
/// 4. Otherwise `::dg_record`.
///
/// A crate naming itself should add `extern crate self as dg_record;` so the
/// absolute path also resolves inside it.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAMES: [&str; 3] = ["defgraph", "dg_core", "dg"];
const CRATE_PREFIX: &str = "dg_";

impl Manifest {
    #[inline(never)]
    fn get_manifest_path() -> PathBuf {
        env::var_os("CARGO_MANIFEST_DIR")
            .map(|path| {
                let mut path = PathBuf::from(path);
                path.push("Cargo.toml");
                assert!(
                    path.exists(),
                    "Cargo manifest does not exist at path {}",
                    path.display(),
                );
                path
            })
            .expect("CARGO_MANIFEST_DIR should be set by cargo")
    }

    #[inline(never)]
    fn get_manifest_modified_time(path: &Path) -> Result<SystemTime, std::io::Error> {
        std::fs::metadata(path).and_then(|metadata| metadata.modified())
    }

    #[inline(never)]
    fn read_manifest(path: &Path) -> Document<Box<str>> {
        let manifest = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()))
            .into_boxed_str();
        Document::parse(manifest)
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()))
    }

    #[inline]
    fn parse_path(path: &str) -> syn::Path {
        syn::parse_str(path).unwrap_or_else(|_| panic!("`{path}` is not a valid path"))
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::parse_path(&format!("::{name}")));
        }

        let module = name.strip_prefix(CRATE_PREFIX)?;
        FACADE_NAMES
            .iter()
            .find(|facade| deps.contains_key(facade))
            .map(|facade| Self::parse_path(&format!("::{facade}::{module}")))
    }

    /// Path of the crate `name` as seen from the caller's `Cargo.toml`.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        for table in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = self.manifest.get(table)
                && let Some(path) = Self::find_in_deps(deps, name)
            {
                return path;
            }
        }

        Self::parse_path(&format!("::{name}"))
    }

    /// Runs `func` with the caller's manifest, reading it at most once per
    /// modification.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let manifest_path = Self::get_manifest_path();
        let modified_time = Self::get_manifest_modified_time(&manifest_path)
            .expect("the Cargo.toml should have a modified time");

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }

        drop(manifests);

        let manifest = Manifest {
            manifest: Self::read_manifest(&manifest_path),
            modified_time,
        };

        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use toml_edit::Document;

    use super::Manifest;

    fn path_string(path: &syn::Path) -> String {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let prefix = if path.leading_colon.is_some() { "::" } else { "" };
        format!("{prefix}{}", segments.join("::"))
    }

    fn manifest(text: &str) -> Manifest {
        Manifest {
            manifest: Document::parse(text.to_owned().into_boxed_str()).unwrap(),
            modified_time: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn direct_dependency() {
        let m = manifest("[dependencies]\ndg_record = \"0.1\"\n");
        assert_eq!(path_string(&m.get_crate_path("dg_record")), "::dg_record");
    }

    #[test]
    fn facade_dependency() {
        let m = manifest("[dependencies]\ndg_core = \"0.1\"\n");
        assert_eq!(path_string(&m.get_crate_path("dg_record")), "::dg_core::record");

        let m = manifest("[dev-dependencies]\ndefgraph = \"0.1\"\n");
        assert_eq!(path_string(&m.get_crate_path("dg_schema")), "::defgraph::schema");
    }

    #[test]
    fn fallback_is_absolute() {
        let m = manifest("[package]\nname = \"x\"\n");
        assert_eq!(path_string(&m.get_crate_path("dg_record")), "::dg_record");
    }
}
