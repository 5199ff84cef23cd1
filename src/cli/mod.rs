use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "scaffold-deps",
    version,
    about = "Resolve and install the dependencies a project generator adds",
    long_about = "scaffold-deps - version resolution and dependency installation for project generators.\n\nExamples:\n  scaffold-deps resolve react @babel/core@^7\n  scaffold-deps add @scaffold/react --dev --babel\n  scaffold-deps apply lodash@^4.17.21 --skip-install\n  scaffold-deps install --yarn"
)]
pub struct ScaffoldCli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Registry base URL
    #[arg(long, global = true, env = "NPM_CONFIG_REGISTRY")]
    pub registry: Option<String>,
    /// Ask npm/yarn for versions instead of querying the registry over HTTP
    #[arg(long, global = true)]
    pub via_package_manager: bool,
    /// package.json describing the generator's own package versions
    #[arg(long, global = true)]
    pub tool_manifest: Option<PathBuf>,
    /// Project manifest to read and update
    #[arg(long, global = true, default_value = "package.json")]
    pub manifest: PathBuf,
    /// Use yarn instead of npm
    #[arg(long, global = true)]
    pub yarn: bool,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct InstallFlags {
    /// Save as devDependencies
    #[arg(long, short = 'D')]
    pub dev: bool,
    /// Only record the dependencies in the manifest
    #[arg(long)]
    pub skip_install: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version that would be installed for each package
    Resolve {
        /// package names, optionally with a range (name@range)
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Resolve packages and add them to the project
    Add {
        #[arg(required = true)]
        packages: Vec<String>,
        #[command(flatten)]
        flags: InstallFlags,
        /// Also add the babel packages the project is missing
        #[arg(long)]
        babel: bool,
    },
    /// Install already resolved name@version specifiers
    Apply {
        #[arg(required = true)]
        specifiers: Vec<String>,
        #[command(flatten)]
        flags: InstallFlags,
    },
    /// Run a bare install of the manifest's dependencies
    #[command(alias = "i")]
    Install,
}

impl ScaffoldCli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.command {
            None => {
                self.print_help();
                Ok(())
            }
            Some(Commands::Resolve { packages }) => commands::cmd_resolve(&self.global, packages),
            Some(Commands::Add { packages, flags, babel }) => {
                commands::cmd_add(&self.global, packages, *flags, *babel)
            }
            Some(Commands::Apply { specifiers, flags }) => {
                commands::cmd_apply(&self.global, specifiers, *flags)
            }
            Some(Commands::Install) => commands::cmd_install(&self.global),
        }
    }

    fn print_help(&self) {
        println!("scaffold-deps - resolve and install generator dependencies\n");
        println!(
            "Commands:\n  resolve <pkg[@range]..>\n  add <pkg[@range]..> [--dev] [--skip-install] [--babel]\n  apply <name@version..> [--dev] [--skip-install]\n  install\n\nGlobal: [--yarn] [--registry URL] [--via-package-manager] [--tool-manifest PATH] [--manifest PATH]"
        );
    }
}
