use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;
use std::process::exit;

use crate::bundle::{self, InstallationEntry};
use crate::cli::{ConductArgs, SandboxArgs, SandboxCommands, SandboxRunOpts};
use crate::config::Config;
use crate::{exec, logging, poll};

pub struct Tasks {
    config: Config,
    force: bool,
    dry_run: bool,
}

impl Tasks {
    pub fn new(config: Config, force: bool, dry_run: bool) -> Self {
        Tasks {
            config,
            force,
            dry_run,
        }
    }

    pub fn sandbox(&self, args: &SandboxArgs) -> Result<()> {
        let argv = args.command.to_args();
        if self.dry_run {
            logging::info(&format!(
                "[DRY RUN] Would run {}",
                exec::render(&self.config.sandbox_command, &argv)
            ));
            return Ok(());
        }

        let code = exec::run_passthrough(&self.config.sandbox_command, &argv)?;
        if code != 0 {
            logging::error(&format!(
                "{} exited with status {code}",
                self.config.sandbox_command
            ));
            exit(code);
        }

        if let SandboxCommands::Run(opts) | SandboxCommands::Start(opts) = &args.command {
            self.await_sandbox_started(opts)?;
            logging::success("ConductR sandbox is up");
        }
        Ok(())
    }

    pub fn conduct(&self, args: &ConductArgs) -> Result<()> {
        let argv = args.to_args();
        if self.dry_run {
            logging::info(&format!(
                "[DRY RUN] Would run {}",
                exec::render(&self.config.conduct_command, &argv)
            ));
            return Ok(());
        }

        let code = exec::run_passthrough(&self.config.conduct_command, &argv)?;
        if code != 0 {
            logging::error(&format!(
                "{} exited with status {code}",
                self.config.conduct_command
            ));
            exit(code);
        }
        Ok(())
    }

    pub fn install(&self) -> Result<()> {
        let entries = self.collect_entries()?;
        if entries.is_empty() {
            logging::warn("No bundles found to install");
            return Ok(());
        }

        if self.dry_run {
            for entry in &entries {
                logging::info(&format!(
                    "[DRY RUN] Would load and run bundle {}",
                    entry.name
                ));
            }
            return Ok(());
        }

        for entry in &entries {
            logging::info(&format!("Installing bundle {}", entry.name));
            let bundle_id = self.load_bundle(entry)?;
            exec::run(
                &self.config.conduct_command,
                &["run".to_string(), bundle_id],
            )?;
            self.await_bundle_visible(&entry.name)?;
            logging::success(&format!("Bundle {} is running", entry.name));
        }

        exec::run(&self.config.conduct_command, &["info".to_string()])
    }

    pub fn generate_installation_script(&self, output: &Path) -> Result<()> {
        let entries = self.collect_entries()?;
        if entries.is_empty() {
            bail!("No bundles found to install");
        }

        let base = output.parent().unwrap_or_else(|| Path::new(""));
        let script = bundle::render_script(&entries, base, &self.config.conduct_command);

        if self.dry_run {
            print!("{script}");
            return Ok(());
        }

        if output.exists() && !self.force {
            let confirmation = dialoguer::Confirm::new()
                .with_prompt(format!("Overwrite {}?", output.display()))
                .default(false)
                .interact()
                .context("Overwrite confirmation failed")?;

            if !confirmation {
                logging::info("Script generation cancelled");
                return Ok(());
            }
        }

        bundle::write_script(output, &script)?;
        logging::success(&format!(
            "Wrote installation script to {}",
            output.display()
        ));
        Ok(())
    }

    fn collect_entries(&self) -> Result<Vec<InstallationEntry>> {
        if !self.config.bundles.is_empty() {
            return Ok(self
                .config
                .bundles
                .iter()
                .map(InstallationEntry::from)
                .collect());
        }
        bundle::discover(&self.config.bundle_dir)
    }

    fn load_bundle(&self, entry: &InstallationEntry) -> Result<String> {
        let mut argv = vec![
            "load".to_string(),
            "-q".to_string(),
            entry.bundle.display().to_string(),
        ];
        if let Some(configuration) = &entry.configuration {
            argv.push(configuration.display().to_string());
        }

        let (code, lines) = exec::capture(&self.config.conduct_command, &argv)?;
        if code != 0 {
            bail!(
                "Failed to load bundle {} (`{}` exited with status {code})",
                entry.name,
                self.config.conduct_command
            );
        }

        lines
            .iter()
            .rev()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!(
                    "`{} load` printed no bundle identifier for {}",
                    self.config.conduct_command,
                    entry.name
                )
            })
    }

    fn await_sandbox_started(&self, opts: &SandboxRunOpts) -> Result<()> {
        let expected = opts.nr_of_containers.unwrap_or(1) as usize;
        logging::info(&format!(
            "Waiting for {expected} sandbox container(s) to report"
        ));

        poll::await_condition(
            "the ConductR sandbox containers",
            self.config.deadline(),
            || {
                let (code, lines) = exec::capture(
                    &self.config.sandbox_command,
                    &["ps".to_string(), "-q".to_string()],
                )?;
                if code != 0 {
                    bail!(
                        "`{} ps` exited with status {code}",
                        self.config.sandbox_command
                    );
                }
                Ok(lines.join("\n"))
            },
            |status| {
                status
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .count()
                    >= expected
            },
        )
    }

    fn await_bundle_visible(&self, name: &str) -> Result<()> {
        poll::await_condition(
            &format!("bundle {name}"),
            self.config.deadline(),
            || Ok(self.bundle_names()?.join("\n")),
            |status| status.lines().any(|candidate| candidate == name),
        )
    }

    /// Best-effort scrape of the `conduct info` bundle listing: one header
    /// line, then at most ten rows whose second column is the bundle name.
    /// The listing format is not a contract, so anything unexpected yields
    /// an empty set rather than a wrong one.
    pub fn bundle_names(&self) -> Result<Vec<String>> {
        let (code, lines) =
            exec::capture(&self.config.conduct_command, &["info".to_string()])?;
        if code != 0 {
            return Ok(Vec::new());
        }

        Ok(lines
            .iter()
            .skip(1)
            .take(10)
            .filter_map(|line| line.split_whitespace().nth(1))
            .map(str::to_string)
            .collect())
    }
}
