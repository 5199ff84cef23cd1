use super::context::{build_registry, load_tool_versions};
use crate::cli::GlobalArgs;
use crate::colors::*;
use crate::error::Result;
use crate::resolver::VersionResolver;

pub fn cmd_resolve(global: &GlobalArgs, packages: &[String]) -> Result<()> {
    let registry = build_registry(global)?;
    let tools = load_tool_versions(global)?;
    let resolver = VersionResolver::new(registry.as_ref(), &tools);
    for spec in resolver.resolve_versioned_packages(packages)? {
        println!("{}{spec}{}", paint(C_CYAN), paint(C_RESET));
    }
    Ok(())
}
