// Include/exclude filtering of routes exposed as tools

use crate::docs::ApiSpec;
use crate::route::RouteDescriptor;

/// Placeholder names recognized by the wildcard form of [`matches`].
/// Deliberately narrow; other names only match through exact or prefix patterns.
const WILDCARD_PLACEHOLDERS: [&str; 2] = [":id", ":param"];

/// Path-pattern filter.
///
/// A non-empty include list is a strict allow-list and the exclude list is
/// ignored. Otherwise routes matching any exclude pattern are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl RouteFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Filter routes, always dropping the protocol endpoint at `mount_path`
    pub fn apply(&self, routes: Vec<RouteDescriptor>, mount_path: Option<&str>) -> Vec<RouteDescriptor> {
        routes
            .into_iter()
            .filter(|route| !mount_path.is_some_and(|mount| is_under_mount(&route.path, mount)))
            .filter(|route| self.allows(&route.path))
            .collect()
    }

    pub fn allows(&self, path: &str) -> bool {
        if !self.include.is_empty() {
            return self.include.iter().any(|pattern| matches(path, pattern));
        }
        !self.exclude.iter().any(|pattern| matches(path, pattern))
    }
}

/// Documentation-tag filter with the same precedence rule as [`RouteFilter`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl TagFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Undocumented routes have no tags: a non-empty include list drops them,
    /// an exclude list never does.
    pub fn apply(&self, routes: Vec<RouteDescriptor>, docs: Option<&ApiSpec>) -> Vec<RouteDescriptor> {
        if self.is_empty() {
            return routes;
        }

        routes
            .into_iter()
            .filter(|route| {
                let tags: &[String] = docs
                    .and_then(|spec| spec.route(&route.method, &route.path))
                    .map(|doc| doc.operation.tags.as_slice())
                    .unwrap_or_default();
                self.allows(tags)
            })
            .collect()
    }

    pub fn allows(&self, tags: &[String]) -> bool {
        if !self.include.is_empty() {
            return tags.iter().any(|tag| self.include.contains(tag));
        }
        !tags.iter().any(|tag| self.exclude.contains(tag))
    }
}

/// Match a route path against a filter pattern.
///
/// Supported forms: exact equality; a trailing `*` for prefix matching; and a
/// route whose `:id` / `:param` placeholders are replaced by `*` equalling the
/// pattern. Other placeholder names are not recognized by the last form.
pub fn matches(path: &str, pattern: &str) -> bool {
    if path == pattern {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return path.starts_with(prefix);
    }

    if path.contains(':') {
        let wildcarded = WILDCARD_PLACEHOLDERS
            .iter()
            .fold(path.to_string(), |acc, placeholder| acc.replace(placeholder, "*"));
        return wildcarded == pattern;
    }

    false
}

fn is_under_mount(path: &str, mount: &str) -> bool {
    path == mount
        || path
            .strip_prefix(mount.trim_end_matches('/'))
            .is_some_and(|rest| rest.starts_with('/'))
}
