use crate::cli::GlobalArgs;
use crate::error::Result;
use crate::fetch::{HttpRegistry, PackageManagerRegistry, Registry};
use crate::installer::{PackageManager, SystemRunner};
use crate::manifest;
use crate::resolver::ToolVersions;

pub(super) fn build_registry(global: &GlobalArgs) -> Result<Box<dyn Registry>> {
    if global.via_package_manager {
        let manager = PackageManager::from_use_yarn(global.yarn);
        Ok(Box::new(PackageManagerRegistry::new(manager, SystemRunner::new())))
    } else {
        Ok(Box::new(HttpRegistry::new(global.registry.clone())?))
    }
}

pub(super) fn load_tool_versions(global: &GlobalArgs) -> Result<ToolVersions> {
    match &global.tool_manifest {
        Some(path) => {
            let tool = manifest::load(path)?;
            ToolVersions::from_manifest(&tool, "scaffold")
        }
        None => ToolVersions::builtin(),
    }
}

/// Runner whose working directory is the folder holding the project manifest.
pub(super) fn project_runner(global: &GlobalArgs) -> SystemRunner {
    match global.manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => SystemRunner::in_dir(dir),
        _ => SystemRunner::new(),
    }
}
