use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use deepn::cli;
use deepn::workspace;

#[derive(Parser)]
#[command(name = "init_workspace", about = "Create a DEEPN work folder")]
struct Cli {
    /// Work folder to create; must not exist yet
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    let cli_args = Cli::parse();

    cli::banner("Init Workspace");

    workspace::init_workspace(&cli_args.dir)?;
    for folder in workspace::INPUT_FOLDERS {
        cli::kv(folder, &cli_args.dir.join(folder).display().to_string());
    }
    cli::success(&format!(
        "created {}; place SAM files in {}",
        cli_args.dir.display(),
        workspace::SAM_FILES
    ));
    eprintln!();

    Ok(())
}
