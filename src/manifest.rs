use crate::error::{Result, ScaffoldError};
use crate::installer::{CommandRunner, PackageManager};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies", skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Everything else in package.json, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Top-level key order of the file this was read from.
    #[serde(skip)]
    key_order: Vec<String>,
}

impl Manifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: Some(name.into()), version: Some(version.into()), ..Self::default() }
    }

    /// True when `name` is a key of either dependency map.
    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    /// Declared range for `name`, runtime dependencies first.
    pub fn declared_range(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .map(String::as_str)
    }

    /// Parses package.json text, remembering its key order for [`to_json_pretty`](Self::to_json_pretty).
    pub fn from_json_str(data: &str) -> serde_json::Result<Self> {
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(data)?;
        let key_order = fields.keys().cloned().collect();
        let mut manifest: Manifest = serde_json::from_value(serde_json::Value::Object(fields))?;
        manifest.key_order = key_order;
        Ok(manifest)
    }

    /// Pretty JSON with keys that were present on load kept in their original place.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let fields = match serde_json::to_value(self)? {
            serde_json::Value::Object(fields) => fields,
            other => return serde_json::to_string_pretty(&other),
        };
        let mut ordered = serde_json::Map::new();
        for key in &self.key_order {
            if let Some(value) = fields.get(key) {
                ordered.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in fields {
            if !ordered.contains_key(&key) {
                ordered.insert(key, value);
            }
        }
        serde_json::to_string_pretty(&serde_json::Value::Object(ordered))
    }
}

pub fn load(path: &Path) -> Result<Manifest> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let m = Manifest::from_json_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(m)
}

pub fn write(manifest: &Manifest, path: &Path) -> Result<()> {
    let mut data = manifest.to_json_pretty()?;
    data.push('\n');
    fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Persistence for the project manifest.
pub trait ManifestStore {
    fn read(&self) -> Result<Option<Manifest>>;
    fn write(&self, manifest: &Manifest) -> Result<()>;
    fn location(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct JsonManifestStore {
    path: PathBuf,
}

impl JsonManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonManifestStore {
    fn default() -> Self {
        Self::new("package.json")
    }
}

impl ManifestStore for JsonManifestStore {
    fn read(&self) -> Result<Option<Manifest>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load(&self.path).map(Some)
    }

    fn write(&self, manifest: &Manifest) -> Result<()> {
        write(manifest, &self.path)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads the manifest, running `<manager> init -y` first when none exists.
pub fn retrieve_manifest(
    store: &dyn ManifestStore,
    runner: &dyn CommandRunner,
    manager: PackageManager,
) -> Result<Manifest> {
    if let Some(existing) = store.read()? {
        return Ok(existing);
    }
    let status = runner.run(manager.program(), &["init".to_string(), "-y".to_string()])?;
    if status != 0 {
        return Err(ScaffoldError::Installation { manager: manager.program().to_string(), status }
            .into());
    }
    store
        .read()?
        .ok_or_else(|| ScaffoldError::ManifestMissing { path: store.location() }.into())
}
