use clap::{Args, Subcommand};
use gitship_types::AuthMode;

#[derive(Args, Clone, Debug, Default)]
pub struct OutputArgs {
    /// Print the result as JSON on stdout instead of rendered progress
    #[arg(long, help_heading = "Output Options")]
    pub json: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the stored project (token redacted) and pipeline settings
    Show(OutputArgs),
    /// Replace the stored project record
    Set(ConfigSetArgs),
    /// Print the config file location
    Path,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Remote repository URL, e.g. https://github.com/owner/repo.git
    #[arg(long, value_name = "URL")]
    pub repository_url: String,

    /// Commit author name
    #[arg(long, value_name = "NAME")]
    pub username: String,

    /// Commit author email
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// How pushes authenticate: password (git prompts or helpers) or token
    #[arg(long, value_name = "MODE", default_value = "password")]
    pub auth_mode: AuthMode,

    /// Access token, required when --auth-mode token
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,
}

#[derive(Args)]
pub struct ReleaseArgs {
    /// Version label used as the tag name, e.g. v1.2.0
    #[arg(value_name = "VERSION")]
    pub version: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[cfg(test)]
mod tests {
    use crate::cli::{Args, Command, ConfigCommand};
    use clap::Parser;

    #[test]
    fn test_release_accepts_empty_label_for_later_validation() {
        let args = Args::try_parse_from(["gitship", "release", ""]).unwrap();
        match args.command {
            Command::Release(release) => assert_eq!(release.version, ""),
            _ => panic!("expected release"),
        }
    }

    #[test]
    fn test_config_set_parses_auth_mode() {
        let args = Args::try_parse_from([
            "gitship",
            "config",
            "set",
            "--repository-url",
            "https://example.com/u/r.git",
            "--username",
            "u",
            "--email",
            "u@example.com",
            "--auth-mode",
            "Token",
            "--token",
            "abc123",
        ])
        .unwrap();
        match args.command {
            Command::Config(config) => match config.command {
                ConfigCommand::Set(set) => {
                    assert_eq!(set.auth_mode, gitship_types::AuthMode::Token);
                    assert_eq!(set.token.as_deref(), Some("abc123"));
                }
                _ => panic!("expected config set"),
            },
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_global_flags_and_json() {
        let args =
            Args::try_parse_from(["gitship", "trigger", "--json", "-C", "/tmp"]).unwrap();
        assert!(args.json_output());
        assert_eq!(args.workspace.as_deref(), Some(std::path::Path::new("/tmp")));
    }

    #[test]
    fn test_unknown_auth_mode_is_rejected() {
        assert!(Args::try_parse_from([
            "gitship",
            "config",
            "set",
            "--repository-url",
            "https://example.com/u/r.git",
            "--username",
            "u",
            "--email",
            "u@example.com",
            "--auth-mode",
            "ssh",
        ])
        .is_err());
    }
}
