pub mod args;
pub mod commands;
pub mod render;

pub use args::{ConfigArgs, ConfigCommand, ConfigSetArgs, OutputArgs, ReleaseArgs};
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "gitship")]
#[command(version = crate::VERSION)]
#[command(about = "Publish a working tree, trigger its CI build and cut releases")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: save the project with `config set`, then publish, trigger a build and release."
)]
pub struct Args {
    /// Working tree to operate on (default: current directory)
    #[arg(long, short = 'C', global = true, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// Path to the config file (default: {workspace}/.gitship/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// The working tree, which must already exist.
    pub fn workspace_path(&self) -> crate::Result<PathBuf> {
        let path = match &self.workspace {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        if !path.is_dir() {
            return Err(anyhow!("workspace {} is not a directory", path.display()));
        }
        Ok(path)
    }

    /// Whether stdout is reserved for a JSON document.
    pub fn json_output(&self) -> bool {
        match &self.command {
            Command::Publish(output) | Command::Trigger(output) | Command::Urls(output) => {
                output.json
            }
            Command::Release(release) => release.output.json,
            Command::Config(config) => match &config.command {
                ConfigCommand::Show(output) => output.json,
                ConfigCommand::Set(_) | ConfigCommand::Path => false,
            },
            Command::Doctor => false,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "View or change the stored project settings",
        long_about = "Config manages the single project record: repository URL, identity, auth mode and token.",
        after_help = "Example:\n    gitship config set --repository-url https://github.com/me/app.git --username me --email me@example.com"
    )]
    Config(ConfigArgs),
    #[command(
        about = "Check that git is available and the configuration loads",
        after_help = "Example:\n    gitship doctor"
    )]
    Doctor,
    #[command(
        about = "Push the working tree to the configured remote",
        long_about = "Publish initializes the repository if needed, configures identity and the remote, commits everything and pushes the branch with upstream tracking.",
        after_help = "Example:\n    gitship publish"
    )]
    Publish(OutputArgs),
    #[command(
        about = "Commit a build marker and push it to start CI",
        long_about = "Trigger appends a timestamped marker to the marker file, commits only that file and pushes the branch.",
        after_help = "Example:\n    gitship trigger --json"
    )]
    Trigger(OutputArgs),
    #[command(
        about = "Create an annotated tag and push it",
        after_help = "Example:\n    gitship release v1.2.0"
    )]
    Release(ReleaseArgs),
    #[command(
        about = "Print the repository, CI status and releases pages",
        after_help = "Example:\n    gitship urls"
    )]
    Urls(OutputArgs),
}

/// Run the parsed command. `Ok(false)` means the command ran but did not
/// succeed, which maps to a non-zero exit status.
pub async fn run(args: Args) -> crate::Result<bool> {
    let workspace = args.workspace_path()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| crate::core::config::default_config_path(&workspace));

    match args.command {
        Command::Config(config_args) => match config_args.command {
            ConfigCommand::Show(output) => commands::config_show(&config_path, &output),
            ConfigCommand::Set(set_args) => commands::config_set(&config_path, set_args),
            ConfigCommand::Path => commands::config_path(&config_path),
        },
        Command::Doctor => commands::doctor(&workspace, &config_path).await,
        Command::Publish(output) => {
            commands::operate(&workspace, &config_path, commands::Operation::Publish, &output)
                .await
        }
        Command::Trigger(output) => {
            commands::operate(
                &workspace,
                &config_path,
                commands::Operation::TriggerBuild,
                &output,
            )
            .await
        }
        Command::Release(release) => {
            commands::operate(
                &workspace,
                &config_path,
                commands::Operation::CreateRelease(release.version),
                &release.output,
            )
            .await
        }
        Command::Urls(output) => commands::urls(&config_path, &output),
    }
}
