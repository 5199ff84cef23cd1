use super::context::project_runner;
use crate::cli::GlobalArgs;
use crate::error::Result;
use crate::installer::{DependencyInstaller, InstallOptions};
use crate::manifest::JsonManifestStore;

pub fn cmd_install(global: &GlobalArgs) -> Result<()> {
    let runner = project_runner(global);
    let store = JsonManifestStore::new(&global.manifest);
    let options = InstallOptions { use_yarn: global.yarn, ..InstallOptions::default() };
    DependencyInstaller::new(&runner, &store).install_from_manifest(&options)
}
