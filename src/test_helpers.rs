//! Shared test utilities for the tutorial-press test suite.
//!
//! Provides fixture setup and lookup helpers that work with the content
//! registry and resolved routes.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let registry = fixture_registry(&tmp);
//!
//! let page = find_page(&registry, "intro/setup");
//! assert_eq!(page.title, "Setting Up");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{self, SiteConfig};
use crate::content::ContentFile;
use crate::registry::ContentRegistry;
use crate::resolve::{Route, RouteSegments};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// The copy is a complete project: `config.toml` plus
/// `content/tutorials/`. Tests get an isolated copy they can mutate without
/// affecting other tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Config loaded from the fixture project.
pub fn fixture_config(tmp: &TempDir) -> SiteConfig {
    config::load_config(tmp.path()).unwrap()
}

/// Content root of the fixture project.
pub fn fixture_root(tmp: &TempDir) -> PathBuf {
    fixture_config(tmp).content_root_in(tmp.path())
}

/// Registry built from the fixture project.
pub fn fixture_registry(tmp: &TempDir) -> ContentRegistry {
    ContentRegistry::build(&fixture_root(tmp), "mdx").unwrap()
}

// =========================================================================
// Lookups, panics with a clear message on miss
// =========================================================================

/// Find a page by route key. Panics if not found.
pub fn find_page<'a>(registry: &'a ContentRegistry, key: &str) -> &'a ContentFile {
    registry.get_key(key).unwrap_or_else(|| {
        let keys = route_keys(registry.routes());
        panic!("page '{key}' not found. Available: {keys:?}")
    })
}

/// Route keys (`a/b`) in iteration order.
pub fn route_keys<'a>(routes: impl IntoIterator<Item = &'a RouteSegments>) -> Vec<String> {
    routes.into_iter().map(|r| r.key()).collect()
}

/// Route keys of resolved routes, in listing order.
pub fn listed_keys(routes: &[Route]) -> Vec<String> {
    route_keys(routes.iter().map(|r| &r.segments))
}

/// Read a generated file. Panics with the path if missing.
pub fn read_output(dist: &Path, rel: &str) -> String {
    let path = dist.join(rel);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read output {}: {e}", path.display()))
}
