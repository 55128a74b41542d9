use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Skip confirmations
    #[arg(long)]
    pub force: bool,

    /// Show plan without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Read settings from this file instead of conductr.toml
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the local ConductR sandbox cluster
    Sandbox(SandboxArgs),
    /// Forward a command to the ConductR CLI
    Conduct(ConductArgs),
    /// Load and run every bundle of the project
    Install,
    /// Write a shell script that loads and runs every bundle
    GenerateInstallationScript {
        /// Where to write the script
        #[arg(long, value_name = "FILE", default_value = "install.sh")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct SandboxArgs {
    #[command(subcommand)]
    pub command: SandboxCommands,
}

#[derive(Subcommand, Debug)]
pub enum SandboxCommands {
    /// Start a sandbox cluster
    Run(SandboxRunOpts),
    /// Same as run
    Start(SandboxRunOpts),
    /// Stop the sandbox cluster
    Stop,
    /// List the sandbox containers
    Ps {
        /// Only print container identifiers
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the sandbox logs
    Logs {
        /// Keep following the log output
        #[arg(short, long)]
        follow: bool,
    },
    /// Print the sandbox version
    Version,
}

#[derive(clap::Args, Debug)]
pub struct SandboxRunOpts {
    /// ConductR image version to boot
    #[arg(long, value_name = "VERSION")]
    pub image_version: Option<String>,

    /// Image to boot instead of the default one
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Number of sandbox containers to start
    #[arg(long, value_name = "NR")]
    pub nr_of_containers: Option<u32>,

    /// Number of core instances, optionally with agent instances as NR:NR
    #[arg(long, value_name = "NR[:NR]", value_parser = parse_instance_counts)]
    pub nr_of_instances: Option<InstanceCounts>,

    /// Role assigned to the sandbox nodes, repeatable
    #[arg(long = "conductr-role", value_name = "ROLE")]
    pub conductr_roles: Vec<String>,

    /// Environment variable for core and agent, repeatable
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_var)]
    pub envs: Vec<EnvVar>,

    /// Environment variable for the core only, repeatable
    #[arg(long = "env-core", value_name = "KEY=VALUE", value_parser = parse_env_var)]
    pub core_envs: Vec<EnvVar>,

    /// Environment variable for the agent only, repeatable
    #[arg(long = "env-agent", value_name = "KEY=VALUE", value_parser = parse_env_var)]
    pub agent_envs: Vec<EnvVar>,

    /// Startup argument for core and agent, repeatable
    #[arg(long = "arg", value_name = "ARG")]
    pub args: Vec<String>,

    /// Startup argument for the core only, repeatable
    #[arg(long = "arg-core", value_name = "ARG")]
    pub core_args: Vec<String>,

    /// Startup argument for the agent only, repeatable
    #[arg(long = "arg-agent", value_name = "ARG")]
    pub agent_args: Vec<String>,

    /// Log level of the ConductR processes
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Port to make available from the cluster, repeatable
    #[arg(long = "port", value_name = "PORT")]
    pub ports: Vec<u16>,

    /// Feature to start, with optional feature arguments
    #[arg(long = "feature", value_name = "NAME [ARG]...", num_args = 1..)]
    pub features: Vec<Vec<String>>,

    /// Do not start the default features
    #[arg(long)]
    pub no_default_features: bool,
}

#[derive(clap::Args, Debug)]
pub struct ConductArgs {
    #[command(subcommand)]
    pub command: ConductCommands,

    #[command(flatten)]
    pub connection: ConnectionOpts,
}

#[derive(clap::Args, Debug, Default)]
pub struct ConnectionOpts {
    /// Only print the essential output
    #[arg(short = 'q', global = true)]
    pub quiet: bool,

    /// Print verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print full bundle identifiers
    #[arg(long, global = true)]
    pub long_ids: bool,

    /// Connect to the ConductR instance on this machine
    #[arg(long, global = true)]
    pub local_connection: bool,

    /// ConductR control protocol version
    #[arg(long, global = true, value_name = "VERSION")]
    pub api_version: Option<u8>,

    /// Address of the ConductR control server
    #[arg(short, long, global = true, value_name = "ADDR")]
    pub ip: Option<String>,

    /// Port of the ConductR control server
    #[arg(short, long, global = true, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory holding the ConductR CLI settings
    #[arg(long, global = true, value_name = "DIR")]
    pub settings_dir: Option<PathBuf>,

    /// Settings file overriding the defaults
    #[arg(long, global = true, value_name = "FILE")]
    pub custom_settings_file: Option<PathBuf>,

    /// Directory holding custom CLI plugins
    #[arg(long, global = true, value_name = "DIR")]
    pub custom_plugins_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConductCommands {
    /// Load a bundle, optionally with a configuration
    Load {
        /// Bundle path or URI
        bundle: String,
        /// Configuration path or URI
        configuration: Option<String>,
    },
    /// Run a loaded bundle
    Run {
        /// Bundle identifier or name
        bundle: String,
        /// Number of instances to scale to
        #[arg(long, value_name = "NR")]
        scale: Option<u32>,
        /// Bundle to co-locate the instances with
        #[arg(long, value_name = "BUNDLE")]
        affinity: Option<String>,
    },
    /// Start a stopped bundle
    Start {
        /// Bundle identifier or name
        bundle: String,
        /// Number of instances to scale to
        #[arg(long, value_name = "NR")]
        scale: Option<u32>,
        /// Bundle to co-locate the instances with
        #[arg(long, value_name = "BUNDLE")]
        affinity: Option<String>,
    },
    /// Stop a running bundle
    Stop {
        /// Bundle identifier or name
        bundle: String,
    },
    /// Unload a bundle from the cluster
    Unload {
        /// Bundle identifier or name
        bundle: String,
    },
    /// Show cluster and bundle information
    Info,
    /// List the service names of running bundles
    ServiceNames,
    /// Show the request ACLs of running bundles
    Acls {
        /// Protocol family of the ACLs
        #[arg(value_enum)]
        protocol_family: ProtocolFamily,
    },
    /// Show the events of a bundle
    Events {
        /// Bundle identifier or name
        bundle: String,
        /// Number of events to show
        #[arg(short = 'n', long, value_name = "NR")]
        lines: Option<u32>,
    },
    /// Show the logs of a bundle
    Logs {
        /// Bundle identifier or name
        bundle: String,
        /// Number of log lines to show
        #[arg(short = 'n', long, value_name = "NR")]
        lines: Option<u32>,
    },
    /// Deploy a bundle to the target cluster
    Deploy {
        /// Bundle identifier or name
        bundle: String,
    },
    /// List the cluster core members
    Members,
    /// List the cluster agents
    Agents,
    /// Load the ConductR license
    LoadLicense {
        /// Load the license without contacting the licensing server
        #[arg(long)]
        offline: bool,
    },
    /// Print the ConductR CLI version
    Version,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn parse_env_var(s: &str) -> Result<EnvVar, String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(EnvVar {
            name: name.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceCounts {
    pub cores: u32,
    pub agents: Option<u32>,
}

impl fmt::Display for InstanceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.agents {
            Some(agents) => write!(f, "{}:{agents}", self.cores),
            None => write!(f, "{}", self.cores),
        }
    }
}

fn parse_instance_counts(s: &str) -> Result<InstanceCounts, String> {
    let parse_error = || format!("expected NR or NR:NR, got `{s}`");
    let (cores, agents) = match s.split_once(':') {
        Some((cores, agents)) => (cores, Some(agents)),
        None => (s, None),
    };

    let cores = cores.parse().map_err(|_| parse_error())?;
    let agents = match agents {
        Some(agents) => Some(agents.parse().map_err(|_| parse_error())?),
        None => None,
    };

    Ok(InstanceCounts { cores, agents })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProtocolFamily {
    Http,
    Tcp,
}

impl ProtocolFamily {
    fn as_str(self) -> &'static str {
        match self {
            ProtocolFamily::Http => "http",
            ProtocolFamily::Tcp => "tcp",
        }
    }
}

impl SandboxCommands {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            SandboxCommands::Run(opts) => opts.to_args("run"),
            SandboxCommands::Start(opts) => opts.to_args("start"),
            SandboxCommands::Stop => vec!["stop".to_string()],
            SandboxCommands::Ps { quiet } => {
                let mut args = vec!["ps".to_string()];
                if *quiet {
                    args.push("-q".to_string());
                }
                args
            }
            SandboxCommands::Logs { follow } => {
                let mut args = vec!["logs".to_string()];
                if *follow {
                    args.push("--follow".to_string());
                }
                args
            }
            SandboxCommands::Version => vec!["version".to_string()],
        }
    }
}

impl SandboxRunOpts {
    fn to_args(&self, verb: &str) -> Vec<String> {
        let mut args = vec![verb.to_string()];

        if let Some(image_version) = &self.image_version {
            args.push("--image-version".to_string());
            args.push(image_version.clone());
        }
        if let Some(image) = &self.image {
            args.push("--image".to_string());
            args.push(image.clone());
        }
        if let Some(nr_of_containers) = self.nr_of_containers {
            args.push("--nr-of-containers".to_string());
            args.push(nr_of_containers.to_string());
        }
        if let Some(nr_of_instances) = self.nr_of_instances {
            args.push("--nr-of-instances".to_string());
            args.push(nr_of_instances.to_string());
        }
        for role in &self.conductr_roles {
            args.push("--conductr-role".to_string());
            args.push(role.clone());
        }
        for env in &self.envs {
            args.push("--env".to_string());
            args.push(env.to_string());
        }
        for env in &self.core_envs {
            args.push("--env-core".to_string());
            args.push(env.to_string());
        }
        for env in &self.agent_envs {
            args.push("--env-agent".to_string());
            args.push(env.to_string());
        }
        for arg in &self.args {
            args.push("--arg".to_string());
            args.push(arg.clone());
        }
        for arg in &self.core_args {
            args.push("--arg-core".to_string());
            args.push(arg.clone());
        }
        for arg in &self.agent_args {
            args.push("--arg-agent".to_string());
            args.push(arg.clone());
        }
        if let Some(log_level) = self.log_level {
            args.push("--log-level".to_string());
            args.push(log_level.as_str().to_string());
        }
        for port in &self.ports {
            args.push("--port".to_string());
            args.push(port.to_string());
        }
        for feature in &self.features {
            args.push("--feature".to_string());
            args.extend(feature.iter().cloned());
        }
        if self.no_default_features {
            args.push("--no-default-features".to_string());
        }

        args
    }
}

impl ConductArgs {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = self.command.to_args();
        args.extend(self.connection.to_args());
        args
    }
}

impl ConductCommands {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            ConductCommands::Load {
                bundle,
                configuration,
            } => {
                let mut args = vec!["load".to_string(), bundle.clone()];
                if let Some(configuration) = configuration {
                    args.push(configuration.clone());
                }
                args
            }
            ConductCommands::Run {
                bundle,
                scale,
                affinity,
            } => run_args("run", bundle, *scale, affinity.as_deref()),
            ConductCommands::Start {
                bundle,
                scale,
                affinity,
            } => run_args("start", bundle, *scale, affinity.as_deref()),
            ConductCommands::Stop { bundle } => vec!["stop".to_string(), bundle.clone()],
            ConductCommands::Unload { bundle } => vec!["unload".to_string(), bundle.clone()],
            ConductCommands::Info => vec!["info".to_string()],
            ConductCommands::ServiceNames => vec!["service-names".to_string()],
            ConductCommands::Acls { protocol_family } => {
                vec!["acls".to_string(), protocol_family.as_str().to_string()]
            }
            ConductCommands::Events { bundle, lines } => tail_args("events", bundle, *lines),
            ConductCommands::Logs { bundle, lines } => tail_args("logs", bundle, *lines),
            ConductCommands::Deploy { bundle } => vec!["deploy".to_string(), bundle.clone()],
            ConductCommands::Members => vec!["members".to_string()],
            ConductCommands::Agents => vec!["agents".to_string()],
            ConductCommands::LoadLicense { offline } => {
                let mut args = vec!["load-license".to_string()];
                if *offline {
                    args.push("--offline".to_string());
                }
                args
            }
            ConductCommands::Version => vec!["version".to_string()],
        }
    }
}

fn run_args(verb: &str, bundle: &str, scale: Option<u32>, affinity: Option<&str>) -> Vec<String> {
    let mut args = vec![verb.to_string(), bundle.to_string()];
    if let Some(scale) = scale {
        args.push("--scale".to_string());
        args.push(scale.to_string());
    }
    if let Some(affinity) = affinity {
        args.push("--affinity".to_string());
        args.push(affinity.to_string());
    }
    args
}

fn tail_args(verb: &str, bundle: &str, lines: Option<u32>) -> Vec<String> {
    let mut args = vec![verb.to_string(), bundle.to_string()];
    if let Some(lines) = lines {
        args.push("--lines".to_string());
        args.push(lines.to_string());
    }
    args
}

impl ConnectionOpts {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.quiet {
            args.push("-q".to_string());
        }
        if self.verbose {
            args.push("--verbose".to_string());
        }
        if self.long_ids {
            args.push("--long-ids".to_string());
        }
        if self.local_connection {
            args.push("--local-connection".to_string());
        }
        if let Some(api_version) = self.api_version {
            args.push("--api-version".to_string());
            args.push(api_version.to_string());
        }
        if let Some(ip) = &self.ip {
            args.push("--ip".to_string());
            args.push(ip.clone());
        }
        if let Some(port) = self.port {
            args.push("--port".to_string());
            args.push(port.to_string());
        }
        if let Some(settings_dir) = &self.settings_dir {
            args.push("--settings-dir".to_string());
            args.push(settings_dir.display().to_string());
        }
        if let Some(custom_settings_file) = &self.custom_settings_file {
            args.push("--custom-settings-file".to_string());
            args.push(custom_settings_file.display().to_string());
        }
        if let Some(custom_plugins_dir) = &self.custom_plugins_dir {
            args.push("--custom-plugins-dir".to_string());
            args.push(custom_plugins_dir.display().to_string());
        }

        args
    }
}
