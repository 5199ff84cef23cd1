use crate::colors::{log_error, log_info};
use crate::error::{Result, ScaffoldError};
use crate::manifest::{Manifest, ManifestStore};
use std::collections::BTreeMap;
use std::fmt;

mod process;

pub use process::{CommandOutput, CommandRunner, SystemRunner};

const INSTALL_FAILED: &str = "An error occurred while installing dependencies.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
}

impl PackageManager {
    pub fn from_use_yarn(use_yarn: bool) -> Self {
        if use_yarn { Self::Yarn } else { Self::Npm }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
        }
    }

    /// Subcommand that adds named packages.
    pub fn add_command(self) -> &'static str {
        match self {
            Self::Npm => "install",
            Self::Yarn => "add",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub use_yarn: bool,
    pub skip_install: bool,
    pub install_as_dev_dependencies: bool,
    /// Manifest edited in place when `skip_install` is set.
    pub package_json: Manifest,
}

impl InstallOptions {
    pub fn package_manager(&self) -> PackageManager {
        PackageManager::from_use_yarn(self.use_yarn)
    }
}

/// Splits `name@version` on the last `@`, so scoped names survive.
pub fn parse_specifier(spec: &str) -> Result<(&str, &str)> {
    match spec.rfind('@') {
        Some(idx) if idx > 0 && idx + 1 < spec.len() => Ok((&spec[..idx], &spec[idx + 1..])),
        _ => Err(ScaffoldError::InvalidSpecifier(spec.to_string()).into()),
    }
}

/// Install argument list for `deps`, without the program name.
pub fn install_args<S: AsRef<str>>(options: &InstallOptions, deps: &[S]) -> Vec<String> {
    let manager = options.package_manager();
    let mut args = vec![manager.add_command().to_string()];
    args.extend(deps.iter().map(|d| d.as_ref().to_string()));
    if options.install_as_dev_dependencies {
        args.push("-D".into());
    }
    if manager == PackageManager::Yarn {
        args.push("--ignore-workspace-root-check".into());
    }
    args
}

pub struct DependencyInstaller<'a> {
    runner: &'a dyn CommandRunner,
    store: &'a dyn ManifestStore,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(runner: &'a dyn CommandRunner, store: &'a dyn ManifestStore) -> Self {
        Self { runner, store }
    }

    /// Installs `dependencies`, or records them in `options.package_json` when skipping.
    pub fn install<S: AsRef<str>>(&self, options: &mut InstallOptions, dependencies: &[S]) -> Result<()> {
        if options.skip_install {
            self.record(options, dependencies)
        } else if dependencies.is_empty() {
            // a bare `npm install` is install_from_manifest's job
            Ok(())
        } else {
            self.spawn_install(options, dependencies)
        }
    }

    fn record<S: AsRef<str>>(&self, options: &mut InstallOptions, dependencies: &[S]) -> Result<()> {
        let mut additions: BTreeMap<String, String> = BTreeMap::new();
        for dep in dependencies {
            let (name, version) = parse_specifier(dep.as_ref())?;
            additions.insert(name.to_string(), version.to_string());
        }
        let target = if options.install_as_dev_dependencies {
            &mut options.package_json.dev_dependencies
        } else {
            &mut options.package_json.dependencies
        };
        target.extend(additions);
        self.store.write(&options.package_json)?;
        log_info(&format!("recorded {} dependencies in {} (install skipped)", dependencies.len(), self.store.location()));
        Ok(())
    }

    fn spawn_install<S: AsRef<str>>(&self, options: &InstallOptions, dependencies: &[S]) -> Result<()> {
        let manager = options.package_manager();
        let args = install_args(options, dependencies);
        log_info(&format!("running {} {}", manager, args.join(" ")));
        let status = self.runner.run(manager.program(), &args)?;
        if status != 0 {
            log_error(INSTALL_FAILED);
            return Err(ScaffoldError::Installation { manager: manager.to_string(), status }.into());
        }
        Ok(())
    }

    /// Bare `npm install` / `yarn install` of whatever the manifest declares.
    pub fn install_from_manifest(&self, options: &InstallOptions) -> Result<()> {
        let manager = options.package_manager();
        log_info(&format!("running {} install", manager));
        let status = self.runner.run(manager.program(), &["install".to_string()])?;
        if status != 0 {
            log_error(INSTALL_FAILED);
            return Err(ScaffoldError::Installation { manager: manager.to_string(), status }.into());
        }
        Ok(())
    }
}
