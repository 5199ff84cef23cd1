use crate::error::{Result, ScaffoldError};
use crate::fetch::{pick_published, Registry};
use crate::installer::{CommandOutput, CommandRunner};
use crate::manifest::{Manifest, ManifestStore};
use crate::resolver::ToolVersions;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// In-memory registry answering from a fixed list of published versions.
#[derive(Default)]
pub struct FakeRegistry {
    published: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    pub lookups: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(mut self, name: &str, versions: &[&str]) -> Self {
        self.published
            .insert(name.to_string(), versions.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

impl Registry for FakeRegistry {
    fn latest_version(&self, name: &str, constraint: Option<&str>) -> Result<String> {
        self.lookups
            .lock()
            .unwrap()
            .push((name.to_string(), constraint.map(str::to_string)));
        if self.failing.contains(name) {
            return Err(ScaffoldError::registry(name, "registry unreachable").into());
        }
        let published = self
            .published
            .get(name)
            .ok_or_else(|| ScaffoldError::registry(name, "404 Not Found"))?;
        pick_published(name, published.clone(), None, constraint)
    }
}

type RunHook = Box<dyn Fn(&str, &[String]) + Send + Sync>;

/// Records every invocation and answers with a fixed status.
pub struct RecordingRunner {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
    status: i32,
    stdout: String,
    stderr: String,
    on_run: Option<RunHook>,
}

impl RecordingRunner {
    pub fn with_status(status: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            status,
            stdout: String::new(),
            stderr: String::new(),
            on_run: None,
        }
    }

    pub fn with_stdout(stdout: &str) -> Self {
        Self { stdout: stdout.to_string(), ..Self::with_status(0) }
    }

    pub fn with_stderr(status: i32, stderr: &str) -> Self {
        Self { stderr: stderr.to_string(), ..Self::with_status(status) }
    }

    pub fn on_run(mut self, hook: impl Fn(&str, &[String]) + Send + Sync + 'static) -> Self {
        self.on_run = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        self.calls.lock().unwrap().push((program.to_string(), args.to_vec()));
        if let Some(hook) = &self.on_run {
            hook(program, args);
        }
        Ok(self.status)
    }

    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push((program.to_string(), args.to_vec()));
        Ok(CommandOutput {
            status: self.status,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub current: Mutex<Option<Manifest>>,
    pub writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn holding(manifest: Manifest) -> Self {
        Self { current: Mutex::new(Some(manifest)), writes: Mutex::new(0) }
    }

    pub fn saved(&self) -> Option<Manifest> {
        self.current.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl ManifestStore for MemoryStore {
    fn read(&self) -> Result<Option<Manifest>> {
        Ok(self.current.lock().unwrap().clone())
    }

    fn write(&self, manifest: &Manifest) -> Result<()> {
        *self.current.lock().unwrap() = Some(manifest.clone());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}

pub fn tools(self_version: &str) -> ToolVersions {
    let mut pinned = BTreeMap::new();
    pinned.insert("@scaffold/react".to_string(), "5.0.0".to_string());
    pinned.insert("@scaffold/vue".to_string(), "^5.1.0".to_string());
    ToolVersions {
        self_name: "@scaffold/cli".into(),
        self_version: self_version.into(),
        family_marker: "scaffold".into(),
        pinned,
    }
}

pub fn deps(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
