use anyhow::Result;
use clap::Parser;
use conductr::cli::{Args, Commands};
use conductr::config::Config;
use conductr::tasks::Tasks;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let tasks = Tasks::new(config, args.force, args.dry_run);

    match args.command {
        Commands::Sandbox(sandbox_args) => tasks.sandbox(&sandbox_args),
        Commands::Conduct(conduct_args) => tasks.conduct(&conduct_args),
        Commands::Install => tasks.install(),
        Commands::GenerateInstallationScript { output } => {
            tasks.generate_installation_script(&output)
        }
    }
}
