use super::context::{build_registry, load_tool_versions, project_runner};
use crate::cli::{GlobalArgs, InstallFlags};
use crate::colors::*;
use crate::error::Result;
use crate::installer::{DependencyInstaller, InstallOptions};
use crate::manifest::{retrieve_manifest, JsonManifestStore};
use crate::resolver::{BabelDependencyPlanner, VersionResolver};

pub fn cmd_add(global: &GlobalArgs, packages: &[String], flags: InstallFlags, babel: bool) -> Result<()> {
    let registry = build_registry(global)?;
    let tools = load_tool_versions(global)?;
    let resolver = VersionResolver::new(registry.as_ref(), &tools);
    let runner = project_runner(global);
    let store = JsonManifestStore::new(&global.manifest);

    let mut options = install_options(global, flags);
    options.package_json = retrieve_manifest(&store, &runner, options.package_manager())?;

    let mut specifiers = resolver.resolve_versioned_packages(packages)?;
    if babel {
        specifiers.extend(BabelDependencyPlanner::new(&resolver).plan(&options.package_json)?);
    }
    DependencyInstaller::new(&runner, &store).install(&mut options, &specifiers)?;
    println!(
        "{gray}[scaffold]{reset} {green}added{reset} {}",
        specifiers.join(" "),
        gray = paint(C_GRAY),
        green = paint(C_GREEN),
        reset = paint(C_RESET)
    );
    Ok(())
}

pub fn cmd_apply(global: &GlobalArgs, specifiers: &[String], flags: InstallFlags) -> Result<()> {
    let runner = project_runner(global);
    let store = JsonManifestStore::new(&global.manifest);
    let mut options = install_options(global, flags);
    if flags.skip_install {
        options.package_json = retrieve_manifest(&store, &runner, options.package_manager())?;
    }
    DependencyInstaller::new(&runner, &store).install(&mut options, specifiers)
}

fn install_options(global: &GlobalArgs, flags: InstallFlags) -> InstallOptions {
    InstallOptions {
        use_yarn: global.yarn,
        skip_install: flags.skip_install,
        install_as_dev_dependencies: flags.dev,
        ..InstallOptions::default()
    }
}
