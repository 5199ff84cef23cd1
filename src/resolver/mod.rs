use crate::colors::log_warn;
use crate::error::{Result, ScaffoldError};
use crate::fetch::Registry;
use crate::manifest::Manifest;
use anyhow::{anyhow, Context};
use rayon::prelude::*;
use semver::{Version, VersionReq};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

pub mod babel;

pub use babel::BabelDependencyPlanner;

const BUILTIN_TOOL_VERSIONS: &str = include_str!("../../tool-versions.json");

/// An npm range: a union of comparator sets joined by `||`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    sets: Vec<VersionReq>,
}

impl NpmRange {
    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|r| r.matches(version))
    }
}

impl FromStr for NpmRange {
    type Err = anyhow::Error;

    fn from_str(range: &str) -> Result<Self> {
        let mut sets = Vec::new();
        for part in range.split("||").map(str::trim) {
            let norm = canonicalize_npm_range(part);
            let req = if norm == "*" {
                VersionReq::STAR
            } else {
                VersionReq::parse(&norm).map_err(|e| {
                    anyhow!("invalid semver range '{}' (orig '{}'): {}", norm, part, e)
                })?
            };
            sets.push(req);
        }
        Ok(Self { sets })
    }
}

/// Highest version in `versions` matching `range`.
pub fn max_satisfying<'a, I>(versions: I, range: &NpmRange) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions
        .into_iter()
        .filter(|v| range.matches(v))
        .max_by(|a, b| a.cmp_precedence(b))
}

/// npm `semver.satisfies`; unparsable input never satisfies.
pub fn satisfies(version: &str, range: &str) -> bool {
    match (parse_loose_version(version), NpmRange::from_str(range)) {
        (Some(v), Ok(r)) => r.matches(&v),
        _ => false,
    }
}

/// Parses a version, tolerating a leading `v`, `=`, `^` or `~`.
pub fn parse_loose_version(input: &str) -> Option<Version> {
    let trimmed = input.trim().trim_start_matches(['^', '~', '=', 'v']);
    Version::parse(trimmed).ok()
}

/// Rewrites one npm comparator set into the syntax the `semver` crate accepts.
///
/// Bare versions are exact in npm but caret in Cargo, so they get an `=`.
/// Whitespace-separated comparators are joined with commas and hyphen ranges
/// become a `>=, <=` pair.
pub fn canonicalize_npm_range(input: &str) -> String {
    let s = input.trim();
    if s.is_empty() || s == "latest" || is_any_version(s) {
        return "*".into();
    }

    if let Some((low, high)) = s.split_once(" - ") {
        let (low, high) = (low.trim(), high.trim());
        if is_version_like(low) && is_version_like(high) {
            return format!(">={}, <={}", strip_v(low), strip_v(high));
        }
    }

    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in s.split_whitespace() {
        if is_op(token) {
            pending_op = Some(token);
            continue;
        }
        let token = token.trim_end_matches(',');
        let comparator = match pending_op.take() {
            Some(op) => format!("{op}{}", strip_v(token)),
            None => bare_comparator(token),
        };
        comparators.push(comparator);
    }
    if let Some(op) = pending_op {
        // dangling operator, let the semver parser report it
        comparators.push(op.to_string());
    }
    if comparators.iter().any(|c| c == "*") {
        comparators.retain(|c| c != "*");
        if comparators.is_empty() {
            return "*".into();
        }
    }
    comparators.join(", ")
}

fn bare_comparator(token: &str) -> String {
    let first = token.chars().next().unwrap_or('*');
    if matches!(first, '^' | '~' | '>' | '<' | '=') {
        let split = token
            .find(|c: char| !matches!(c, '^' | '~' | '>' | '<' | '='))
            .unwrap_or(token.len());
        let (op, ver) = token.split_at(split);
        return format!("{op}{}", strip_v(ver));
    }
    let ver = strip_v(token);
    if is_any_version(ver) {
        return "*".into();
    }
    if ver.contains(['x', 'X', '*']) {
        return ver.replace('X', "x");
    }
    format!("={ver}")
}

/// `*`, `x`, `x.x.x`, `*.*` and friends.
fn is_any_version(t: &str) -> bool {
    strip_v(t).split('.').all(|part| matches!(part, "*" | "x" | "X"))
}

fn strip_v(t: &str) -> &str {
    t.strip_prefix('v').unwrap_or(t)
}

fn is_op(t: &str) -> bool {
    matches!(t, ">" | "<" | ">=" | "<=" | "=" | "^" | "~")
}

fn is_version_like(t: &str) -> bool {
    let t = strip_v(t);
    !t.is_empty()
        && t.chars().next().is_some_and(|c| c.is_ascii_digit())
        && t.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '*'))
}

/// Read-only table of the generator's own package versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersions {
    pub self_name: String,
    pub self_version: String,
    /// Package names containing this marker are looked up in `pinned`.
    pub family_marker: String,
    pub pinned: BTreeMap<String, String>,
}

impl ToolVersions {
    pub fn builtin() -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(BUILTIN_TOOL_VERSIONS).context("parse builtin tool versions")?;
        Self::from_manifest(&manifest, "scaffold")
    }

    /// Builds the table from the generator's own package.json.
    pub fn from_manifest(manifest: &Manifest, family_marker: &str) -> Result<Self> {
        let self_name = manifest
            .name
            .clone()
            .ok_or_else(|| anyhow!("tool manifest has no name"))?;
        let self_version = manifest
            .version
            .clone()
            .ok_or_else(|| anyhow!("tool manifest {self_name} has no version"))?;
        Ok(Self {
            self_name,
            self_version,
            family_marker: family_marker.to_string(),
            pinned: manifest.dev_dependencies.clone(),
        })
    }

    pub fn current_version(&self, package_name: &str) -> Option<&str> {
        if package_name == self.self_name {
            Some(&self.self_version)
        } else if !self.family_marker.is_empty() && package_name.contains(&self.family_marker) {
            self.pinned.get(package_name).map(String::as_str)
        } else {
            None
        }
    }
}

/// Outcome of resolving one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Caret-prefixed version picked from the registry or the tool table.
    Resolved(String),
    /// Registry lookup failed; `version` is the known current value, verbatim.
    Fallback { version: String, cause: String },
}

impl Resolution {
    pub fn version(&self) -> &str {
        match self {
            Resolution::Resolved(v) => v,
            Resolution::Fallback { version, .. } => version,
        }
    }

    pub fn into_version(self) -> String {
        match self {
            Resolution::Resolved(v) => v,
            Resolution::Fallback { version, .. } => version,
        }
    }
}

pub struct VersionResolver<'a> {
    registry: &'a dyn Registry,
    tools: &'a ToolVersions,
}

impl<'a> VersionResolver<'a> {
    pub fn new(registry: &'a dyn Registry, tools: &'a ToolVersions) -> Self {
        Self { registry, tools }
    }

    pub fn registry(&self) -> &'a dyn Registry {
        self.registry
    }

    pub fn resolve(&self, package_name: &str, constraint: Option<&str>) -> Result<Resolution> {
        let current = self.tools.current_version(package_name);
        let latest = match self.registry.latest_version(package_name, constraint) {
            Ok(latest) => latest,
            Err(err) => {
                return match current {
                    Some(version) => Ok(Resolution::Fallback {
                        version: version.to_string(),
                        cause: format!("{err:#}"),
                    }),
                    None => Err(ScaffoldError::Resolution {
                        name: package_name.to_string(),
                        source: err,
                    }
                    .into()),
                };
            }
        };

        let chosen = match current {
            Some(current) if prefer_current(current, &latest, constraint) => {
                parse_loose_version(current).map(|v| v.to_string()).unwrap_or(latest)
            }
            _ => latest,
        };
        Ok(Resolution::Resolved(format!("^{chosen}")))
    }

    /// Like [`resolve`](Self::resolve) but warns and unwraps a fallback.
    pub fn resolve_version(&self, package_name: &str, constraint: Option<&str>) -> Result<String> {
        let resolution = self.resolve(package_name, constraint)?;
        if let Resolution::Fallback { cause, .. } = &resolution {
            log_warn(&format!("{package_name}: {cause}"));
        }
        Ok(resolution.into_version())
    }

    /// Resolves every name concurrently, keeping input order.
    pub fn resolve_many<S: AsRef<str> + Sync>(&self, package_names: &[S]) -> Result<Vec<String>> {
        package_names
            .par_iter()
            .map(|name| self.resolve_version(name.as_ref(), None))
            .collect()
    }

    /// Same as [`resolve_many`](Self::resolve_many) but yields `name@version`.
    pub fn resolve_specifiers<S: AsRef<str> + Sync>(
        &self,
        package_names: &[S],
    ) -> Result<Vec<String>> {
        package_names
            .par_iter()
            .map(|name| {
                let name = name.as_ref();
                self.resolve_version(name, None).map(|v| format!("{name}@{v}"))
            })
            .collect()
    }

    /// Resolves `name` or `name@constraint` requests into `name@version`.
    pub fn resolve_versioned_packages<S: AsRef<str> + Sync>(
        &self,
        requests: &[S],
    ) -> Result<Vec<String>> {
        requests
            .par_iter()
            .map(|request| {
                let (name, constraint) = split_request(request.as_ref());
                self.resolve_version(name, constraint).map(|v| format!("{name}@{v}"))
            })
            .collect()
    }
}

fn prefer_current(current: &str, latest: &str, constraint: Option<&str>) -> bool {
    let (Some(cur), Some(lat)) = (parse_loose_version(current), parse_loose_version(latest)) else {
        return false;
    };
    let allowed = match constraint {
        None => true,
        Some(range) => NpmRange::from_str(range).map(|r| r.matches(&cur)).unwrap_or(false),
    };
    allowed && cur.cmp_precedence(&lat) == Ordering::Greater
}

/// Splits `name@constraint`; a scoped name alone has no constraint.
pub fn split_request(request: &str) -> (&str, Option<&str>) {
    match request.rfind('@') {
        Some(idx) if idx > 0 => {
            let (name, rest) = request.split_at(idx);
            let constraint = &rest[1..];
            (name, (!constraint.is_empty()).then_some(constraint))
        }
        _ => (request, None),
    }
}
