//! CLI argument definitions for the hosts manager.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use hosts_model::UpdateFrequency;

#[derive(Parser)]
#[command(
    name = "hosts-manager",
    version,
    about = "Manage the system hosts file with profiles, backups, and remote lists",
    long_about = "Manage the system hosts file.\n\n\
                  Configs are named hosts profiles that can be applied atomically.\n\
                  Writes snapshot the replaced content as automatic backups.\n\
                  Remote sources merge published hosts lists into marker-delimited regions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Application data directory (default: ~/.hosts-manager).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Operate on this hosts file instead of the platform location.
    #[arg(long = "hosts-file", value_name = "PATH", global = true)]
    pub hosts_file: Option<PathBuf>,

    /// How many automatic backups to keep (default: 10).
    #[arg(long = "backup-retention", value_name = "N", global = true)]
    pub backup_retention: Option<usize>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage named hosts profiles.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Inspect and write the system hosts file.
    #[command(subcommand)]
    Hosts(HostsCommand),

    /// Manage hosts file snapshots.
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Manage remote hosts lists.
    #[command(subcommand)]
    Remote(RemoteCommand),

    /// Report the resolved environment and store health.
    Doctor,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// List all configs.
    List,

    /// Show one config, including its content.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Create a config from a file or inline content.
    Create {
        /// Display name for the config.
        #[arg(long = "name", value_name = "NAME")]
        name: String,

        /// Free-form description.
        #[arg(long = "description", value_name = "TEXT", default_value = "")]
        description: String,

        #[command(flatten)]
        content: ContentArgs,
    },

    /// Update a config's name, description, or content.
    Update {
        #[arg(value_name = "ID")]
        id: String,

        /// New display name (unchanged when omitted).
        #[arg(long = "name", value_name = "NAME")]
        name: Option<String>,

        /// New description (unchanged when omitted).
        #[arg(long = "description", value_name = "TEXT")]
        description: Option<String>,

        /// Read replacement content from a file.
        #[arg(long = "file", value_name = "PATH", conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Replacement content given inline.
        #[arg(long = "content", value_name = "TEXT")]
        content: Option<String>,
    },

    /// Delete a config. The active config cannot be deleted.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Write a config's content to the hosts file and mark it active.
    Apply {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Re-fetch a remote-sourced config's list and refresh its content.
    Sync {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum HostsCommand {
    /// Print the resolved hosts file location.
    Path,

    /// Print the current hosts file content.
    Show,

    /// Validate the hosts file, or another file, without writing anything.
    Validate {
        /// File to validate instead of the live hosts file.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Snapshot, validate, and write new hosts content.
    Write {
        #[command(flatten)]
        content: ContentArgs,

        /// Re-encode the content to the legacy ANSI (GBK) codepage.
        #[arg(long = "ansi")]
        ansi: bool,
    },

    /// Replace the hosts file with the default document and deactivate
    /// every config.
    RestoreDefault,
}

#[derive(Subcommand)]
pub enum BackupCommand {
    /// List all backups, most recent first.
    List,

    /// Show one backup, including its content.
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Snapshot the current hosts file as a manual backup.
    Create {
        /// Description recorded on the backup.
        #[arg(long = "description", value_name = "TEXT", default_value = "Manual backup")]
        description: String,

        /// Label to attach; repeat for multiple tags.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Delete a manual backup. Automatic backups are pruned, not deleted.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Write a backup's content back to the hosts file.
    Restore {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Replace a backup's tags.
    Tag {
        #[arg(value_name = "ID")]
        id: String,

        /// New tag set; an empty list clears the tags.
        #[arg(value_name = "TAG")]
        tags: Vec<String>,
    },

    /// Replace a backup's description.
    Describe {
        #[arg(value_name = "ID")]
        id: String,

        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Delete every automatic backup.
    ClearAuto,

    /// Print aggregate backup counts and sizes.
    Stats,
}

#[derive(Subcommand)]
pub enum RemoteCommand {
    /// List all remote sources.
    List,

    /// Track a new remote hosts list.
    Add {
        /// Display name; also names the merge region in the hosts file.
        #[arg(long = "name", value_name = "NAME")]
        name: String,

        /// http(s) URL of the hosts list.
        #[arg(long = "url", value_name = "URL")]
        url: String,

        /// When the source is refreshed.
        #[arg(long = "update-freq", value_enum, default_value = "manual")]
        update_freq: UpdateFreqArg,
    },

    /// Update a source's name, url, or update frequency.
    Update {
        #[arg(value_name = "ID")]
        id: String,

        /// New display name (unchanged when omitted).
        #[arg(long = "name", value_name = "NAME")]
        name: Option<String>,

        /// New URL (unchanged when omitted).
        #[arg(long = "url", value_name = "URL")]
        url: Option<String>,

        /// New update frequency (unchanged when omitted).
        #[arg(long = "update-freq", value_enum)]
        update_freq: Option<UpdateFreqArg>,
    },

    /// Untrack a source and clean its region out of the hosts file.
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Fetch a source's list and print it without applying anything.
    Fetch {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Fetch a source and merge it into the hosts file.
    Apply {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Fetch a source and import the merged result as a new config.
    Import {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Apply every tracked source to the hosts file in turn.
    UpdateAll,

    /// Run the startup reconciliation pass synchronously.
    RefreshStartup,
}

/// Content input shared by commands that write hosts text.
#[derive(Args)]
pub struct ContentArgs {
    /// Read the hosts content from a file.
    #[arg(
        long = "file",
        value_name = "PATH",
        conflicts_with = "content",
        required_unless_present = "content"
    )]
    pub file: Option<PathBuf>,

    /// Hosts content given inline.
    #[arg(long = "content", value_name = "TEXT")]
    pub content: Option<String>,
}

/// CLI update frequency choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum UpdateFreqArg {
    Manual,
    Startup,
}

impl From<UpdateFreqArg> for UpdateFrequency {
    fn from(value: UpdateFreqArg) -> Self {
        match value {
            UpdateFreqArg::Manual => Self::Manual,
            UpdateFreqArg::Startup => Self::Startup,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn config_list_parses() {
        let cli = parse(&["hosts-manager", "config", "list"]);
        assert!(matches!(cli.command, Command::Config(ConfigCommand::List)));
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = parse(&[
            "hosts-manager",
            "backup",
            "stats",
            "--data-dir",
            "/tmp/hosts-data",
            "--backup-retention",
            "5",
        ]);
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/hosts-data")));
        assert_eq!(cli.backup_retention, Some(5));
    }

    #[test]
    fn remote_add_parses_update_frequency() {
        let cli = parse(&[
            "hosts-manager",
            "remote",
            "add",
            "--name",
            "ads",
            "--url",
            "https://example.com/hosts",
            "--update-freq",
            "startup",
        ]);
        let Command::Remote(RemoteCommand::Add { name, url, update_freq }) = cli.command else {
            panic!("expected remote add");
        };
        assert_eq!(name, "ads");
        assert_eq!(url, "https://example.com/hosts");
        assert!(matches!(update_freq, UpdateFreqArg::Startup));
        assert_eq!(UpdateFrequency::from(update_freq), UpdateFrequency::Startup);
    }

    #[test]
    fn hosts_write_requires_a_content_source() {
        let result = Cli::try_parse_from(["hosts-manager", "hosts", "write"]);
        assert!(result.is_err());
    }

    #[test]
    fn hosts_write_rejects_both_content_sources() {
        let result = Cli::try_parse_from([
            "hosts-manager",
            "hosts",
            "write",
            "--file",
            "/tmp/hosts",
            "--content",
            "127.0.0.1 localhost",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn backup_create_collects_repeated_tags() {
        let cli = parse(&[
            "hosts-manager",
            "backup",
            "create",
            "--description",
            "before release",
            "--tag",
            "release",
            "--tag",
            "pinned",
        ]);
        let Command::Backup(BackupCommand::Create { description, tags }) = cli.command else {
            panic!("expected backup create");
        };
        assert_eq!(description, "before release");
        assert_eq!(tags, vec!["release".to_string(), "pinned".to_string()]);
    }
}
