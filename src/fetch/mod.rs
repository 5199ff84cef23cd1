use crate::error::{Result, ScaffoldError};
use crate::installer::{CommandRunner, PackageManager};
use crate::resolver::{max_satisfying, NpmRange};
use anyhow::Context;
use reqwest::blocking::Client;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Answers "which version of this package should be installed".
pub trait Registry: Send + Sync {
	/// Latest published version, or the highest one matching `constraint`.
	fn latest_version(&self, name: &str, constraint: Option<&str>) -> Result<String>;
}

/// Talks to the npm registry JSON API directly.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
	registry: String,
	client: Client,
}

impl HttpRegistry {
	pub fn new(registry: Option<String>) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_secs(30))
			.user_agent(concat!("scaffold-deps/", env!("CARGO_PKG_VERSION")))
			.build()
			.context("build http client")?;
		let registry = registry
			.unwrap_or_else(|| DEFAULT_REGISTRY.into())
			.trim_end_matches('/')
			.to_string();
		Ok(Self { registry, client })
	}

	pub fn package_metadata(&self, name: &str) -> Result<NpmMetadata> {
		let url = format!("{}/{}", self.registry, encode_package_name(name));
		let resp = self
			.client
			.get(&url)
			.header("Accept", "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8")
			.send()
			.with_context(|| format!("GET {}", url))?;
		if !resp.status().is_success() {
			return Err(ScaffoldError::registry(name, format!("registry returned {}", resp.status())).into());
		}
		let meta: NpmMetadata = resp.json().with_context(|| format!("decode metadata for {}", name))?;
		Ok(meta)
	}
}

impl Registry for HttpRegistry {
	fn latest_version(&self, name: &str, constraint: Option<&str>) -> Result<String> {
		let meta = self.package_metadata(name)?;
		let latest_tag = meta.dist_tags.and_then(|t| t.latest);
		let published = meta.versions.into_values().map(|v| v.version);
		pick_published(name, published, latest_tag, constraint)
	}
}

/// Asks the package manager itself (`npm info` / `yarn info`).
#[derive(Debug, Clone)]
pub struct PackageManagerRegistry<R> {
	manager: PackageManager,
	runner: R,
}

impl<R: CommandRunner> PackageManagerRegistry<R> {
	pub fn new(manager: PackageManager, runner: R) -> Self {
		Self { manager, runner }
	}

	fn info(&self, name: &str, field: &str) -> Result<serde_json::Value> {
		let args = vec!["info".to_string(), name.to_string(), field.to_string(), "--json".to_string()];
		let out = self.runner.output(self.manager.program(), &args)?;
		if out.status != 0 {
			let msg = out.stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("no output");
			return Err(ScaffoldError::registry(name, format!("{} info failed: {}", self.manager, msg.trim())).into());
		}
		let value: serde_json::Value = serde_json::from_str(out.stdout.trim())
			.map_err(|e| ScaffoldError::registry(name, format!("unreadable {} info output: {}", self.manager, e)))?;
		// yarn wraps the payload as {"type": "inspect", "data": ...}
		Ok(match value {
			serde_json::Value::Object(mut obj) if obj.contains_key("data") => obj.remove("data").unwrap_or_default(),
			other => other,
		})
	}
}

impl<R: CommandRunner> Registry for PackageManagerRegistry<R> {
	fn latest_version(&self, name: &str, constraint: Option<&str>) -> Result<String> {
		match constraint {
			None => match self.info(name, "version")? {
				serde_json::Value::String(v) => Ok(v),
				other => Err(ScaffoldError::registry(name, format!("unexpected version payload {}", other)).into()),
			},
			Some(_) => {
				let published: Vec<String> = match self.info(name, "versions")? {
					serde_json::Value::Array(items) => {
						items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
					}
					serde_json::Value::String(v) => vec![v],
					other => {
						return Err(ScaffoldError::registry(name, format!("unexpected versions payload {}", other)).into())
					}
				};
				pick_published(name, published, None, constraint)
			}
		}
	}
}

/// Chooses from a published version list the way `npm info name@range` does.
pub fn pick_published<I>(name: &str, published: I, latest_tag: Option<String>, constraint: Option<&str>) -> Result<String>
where
	I: IntoIterator<Item = String>,
{
	let parsed: Vec<Version> = published.into_iter().filter_map(|v| Version::parse(&v).ok()).collect();
	match constraint {
		Some(range) => {
			let req = NpmRange::from_str(range).map_err(|e| ScaffoldError::registry(name, format!("{e:#}")))?;
			max_satisfying(&parsed, &req)
				.map(Version::to_string)
				.ok_or_else(|| ScaffoldError::registry(name, format!("no version matches {}", range)).into())
		}
		None => {
			if let Some(tag) = latest_tag {
				return Ok(tag);
			}
			parsed
				.iter()
				.filter(|v| v.pre.is_empty())
				.max_by(|a, b| a.cmp_precedence(b))
				.or_else(|| parsed.iter().max_by(|a, b| a.cmp_precedence(b)))
				.map(Version::to_string)
				.ok_or_else(|| ScaffoldError::registry(name, "no published versions").into())
		}
	}
}

fn encode_package_name(name: &str) -> String {
	name.replace('/', "%2f")
}

#[derive(Debug, Deserialize, Clone)]
pub struct NpmMetadata {
	#[serde(rename = "dist-tags")]
	pub dist_tags: Option<DistTags>,
	#[serde(default)]
	pub versions: HashMap<String, NpmVersion>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DistTags {
	pub latest: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NpmVersion {
	pub version: String,
}
