use anyhow::Result;
use scaffold_deps::cli::ScaffoldCli;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("scaffold error: {:#}", e);
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let cli = ScaffoldCli::parse();
    cli.run()
}
