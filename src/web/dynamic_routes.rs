//! Next.js static export routes.
//!
//! A static export of a page like `pages/posts/[id].tsx` produces a directory
//! literally named `posts/[id]/`. A request for `/posts/42` has to be served
//! from that directory, so each bracketed directory name matches any single
//! path segment.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Optional manifest at the static root describing the route tree as nested
/// objects, e.g. `{"posts": {"[id]": null}}`.
pub const ROUTES_MANIFEST: &str = "routes.json";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct RouteNode {
    children: BTreeMap<String, RouteNode>,
}

impl RouteNode {
    fn from_json(value: &Value) -> Self {
        let children = match value {
            Value::Object(map) => map
                .iter()
                .map(|(segment, child)| (segment.clone(), Self::from_json(child)))
                .collect(),
            _ => BTreeMap::new(),
        };
        Self { children }
    }

    fn insert(&mut self, segments: &[&str]) {
        let mut node = self;
        for segment in segments {
            node = node.children.entry((*segment).to_string()).or_default();
        }
    }

    fn dynamic_child(&self) -> Option<(&String, &RouteNode)> {
        self.children.iter().find(|(segment, _)| is_dynamic(segment))
    }
}

fn is_dynamic(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('[') && segment.ends_with(']')
}

/// Tree of exported directories that contain at least one `[param]` segment.
#[derive(Debug, Default, Clone)]
pub struct DynamicRoutes {
    root: RouteNode,
}

impl DynamicRoutes {
    /// Loads routes for `static_dir`.
    ///
    /// Uses [`ROUTES_MANIFEST`] when present and valid, otherwise walks the
    /// directory tree. A missing static directory yields no routes.
    pub fn load(static_dir: &Path) -> Self {
        let manifest = static_dir.join(ROUTES_MANIFEST);
        if let Ok(bytes) = std::fs::read(&manifest) {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => {
                    debug!(path = %manifest.display(), "Loaded dynamic routes manifest");
                    return Self {
                        root: RouteNode::from_json(&value),
                    };
                }
                Err(e) => {
                    warn!(path = %manifest.display(), error = %e, "Ignoring invalid routes manifest")
                }
            }
        }

        let routes = Self::scan(static_dir);
        if routes.is_empty() {
            debug!(path = %static_dir.display(), "No dynamic routes found");
        }
        routes
    }

    /// Walks `static_dir` and records every directory path with a `[param]` segment.
    ///
    /// Unreadable entries are skipped; the rest of the tree is still scanned.
    pub fn scan(static_dir: &Path) -> Self {
        let mut routes = Self::default();

        for entry in WalkDir::new(static_dir)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
        {
            let Ok(relative) = entry.path().strip_prefix(static_dir) else {
                continue;
            };
            let segments: Vec<&str> = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect();
            if segments.iter().any(|s| is_dynamic(s)) {
                routes.root.insert(&segments);
            }
        }

        routes
    }

    /// Builds routes from directory paths such as `"posts/[id]"`.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut routes = Self::default();
        for path in paths {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            routes.root.insert(&segments);
        }
        routes
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Maps a request path onto an exported directory.
    ///
    /// Literal segments win over bracketed ones. Returns the directory path
    /// (leading slash, no trailing slash) only when a bracketed segment was
    /// used; other paths are served as they are.
    pub fn resolve(&self, request_path: &str) -> Option<String> {
        let segments: Vec<&str> = request_path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }

        let mut node = &self.root;
        let mut resolved = String::new();
        let mut used_dynamic = false;

        for segment in segments {
            let (name, next) = match node.children.get_key_value(segment) {
                Some(found) => found,
                None => {
                    used_dynamic = true;
                    node.dynamic_child()?
                }
            };
            resolved.push('/');
            resolved.push_str(name);
            node = next;
        }

        used_dynamic.then_some(resolved)
    }
}
