//! Subcommand execution against the hosts service.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use hosts_core::{HostsService, LoggingNotifier, RefreshSummary, ServiceOptions};
use hosts_gateway::validate_hosts_content;
use hosts_model::{Backup, Config, ConfigSource, UpdateFrequency};

use crate::cli::{
    BackupCommand, Cli, Command, ConfigCommand, ContentArgs, HostsCommand, RemoteCommand,
};
use crate::tables::{
    format_size, format_timestamp, print_backup_stats, print_backup_table, print_config_table,
    print_remote_table,
};

pub fn run(cli: Cli) -> Result<()> {
    let options = service_options(&cli);
    let service = HostsService::init(options, Arc::new(LoggingNotifier))?;
    match cli.command {
        Command::Config(command) => run_config(&service, command),
        Command::Hosts(command) => run_hosts(&service, command),
        Command::Backup(command) => run_backup(&service, command),
        Command::Remote(command) => run_remote(&service, command),
        Command::Doctor => run_doctor(&service),
    }
}

fn service_options(cli: &Cli) -> ServiceOptions {
    let mut options = ServiceOptions::default();
    if let Some(dir) = &cli.data_dir {
        options.data_dir = dir.clone();
    }
    options.hosts_path = cli.hosts_file.clone();
    if let Some(retention) = cli.backup_retention {
        options.backup_retention = retention;
    }
    options
}

fn run_config(service: &HostsService, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::List => {
            let configs = service.configs();
            if configs.is_empty() {
                println!("No configs saved yet.");
            } else {
                print_config_table(&configs);
            }
        }
        ConfigCommand::Show { id } => {
            let config = service.config(&id)?;
            print_config_detail(&config);
        }
        ConfigCommand::Create {
            name,
            description,
            content,
        } => {
            let content = load_content(content)?;
            let config = service.create_config(&name, &description, &content)?;
            println!("Created config {} ({})", config.name, config.id);
        }
        ConfigCommand::Update {
            id,
            name,
            description,
            file,
            content,
        } => {
            let existing = service.config(&id)?;
            let name = name.unwrap_or(existing.name);
            let description = description.unwrap_or(existing.description);
            let content = match (file, content) {
                (Some(path), _) => read_content_file(&path)?,
                (None, Some(text)) => text,
                (None, None) => existing.content,
            };
            let config = service.update_config(&id, &name, &description, &content)?;
            println!("Updated config {} ({})", config.name, config.id);
        }
        ConfigCommand::Delete { id } => {
            service.delete_config(&id)?;
            println!("Deleted config {id}");
        }
        ConfigCommand::Apply { id } => {
            let config = service.apply_config(&id)?;
            println!(
                "Applied config {} to {}",
                config.name,
                service.hosts_path().display()
            );
        }
        ConfigCommand::Sync { id } => {
            let config = service.update_config_from_remote(&id)?;
            println!(
                "Synced config {} from {}",
                config.name,
                config.remote_url.as_deref().unwrap_or("its remote source")
            );
        }
    }
    Ok(())
}

fn run_hosts(service: &HostsService, command: HostsCommand) -> Result<()> {
    match command {
        HostsCommand::Path => {
            println!("{}", service.hosts_path().display());
        }
        HostsCommand::Show => {
            let content = service.read_system_hosts()?;
            print_text(&content);
        }
        HostsCommand::Validate { file } => {
            let (content, label) = match file {
                Some(path) => {
                    let content = read_content_file(&path)?;
                    (content, path.display().to_string())
                }
                None => {
                    let label = service.hosts_path().display().to_string();
                    (service.read_system_hosts()?, label)
                }
            };
            validate_hosts_content(&content)?;
            println!("{label} is valid ({} lines)", content.lines().count());
        }
        HostsCommand::Write { content, ansi } => {
            let text = load_content(content)?;
            if ansi {
                service.write_system_hosts_ansi(&text)?;
            } else {
                service.write_system_hosts(&text)?;
            }
            println!("Wrote {}", service.hosts_path().display());
        }
        HostsCommand::RestoreDefault => {
            service.restore_default()?;
            println!(
                "Restored the default document to {}",
                service.hosts_path().display()
            );
        }
    }
    Ok(())
}

fn run_backup(service: &HostsService, command: BackupCommand) -> Result<()> {
    match command {
        BackupCommand::List => {
            let backups = service.backups();
            if backups.is_empty() {
                println!("No backups recorded yet.");
            } else {
                print_backup_table(&backups);
            }
        }
        BackupCommand::Show { id } => {
            let backup = service.backup(&id)?;
            print_backup_detail(&backup);
        }
        BackupCommand::Create { description, tags } => {
            match service.create_backup(&description, false, tags)? {
                Some(backup) => {
                    println!("Created backup {} ({})", backup.id, format_size(backup.size));
                }
                None => println!("Nothing to back up."),
            }
        }
        BackupCommand::Delete { id } => {
            service.delete_backup(&id)?;
            println!("Deleted backup {id}");
        }
        BackupCommand::Restore { id } => {
            service.restore_from_backup(&id)?;
            println!(
                "Restored backup {id} to {}",
                service.hosts_path().display()
            );
        }
        BackupCommand::Tag { id, tags } => {
            let backup = service.update_backup_tags(&id, tags)?;
            if backup.tags.is_empty() {
                println!("Cleared tags on backup {id}");
            } else {
                println!("Tagged backup {id}: {}", backup.tags.join(", "));
            }
        }
        BackupCommand::Describe { id, text } => {
            service.update_backup_description(&id, &text)?;
            println!("Updated description of backup {id}");
        }
        BackupCommand::ClearAuto => {
            let removed = service.clear_automatic_backups()?;
            println!("Removed {removed} automatic backups");
        }
        BackupCommand::Stats => {
            print_backup_stats(&service.backup_stats());
        }
    }
    Ok(())
}

fn run_remote(service: &HostsService, command: RemoteCommand) -> Result<()> {
    match command {
        RemoteCommand::List => {
            let sources = service.remote_sources();
            if sources.is_empty() {
                println!("No remote sources tracked yet.");
            } else {
                print_remote_table(&sources);
            }
        }
        RemoteCommand::Add {
            name,
            url,
            update_freq,
        } => {
            let source = service.add_remote_source(&name, &url, update_freq.into())?;
            println!("Added remote source {} ({})", source.name, source.id);
        }
        RemoteCommand::Update {
            id,
            name,
            url,
            update_freq,
        } => {
            let existing = service.remote_source(&id)?;
            let name = name.unwrap_or(existing.name);
            let url = url.unwrap_or(existing.url);
            let update_freq = update_freq
                .map(UpdateFrequency::from)
                .unwrap_or(existing.update_freq);
            let source = service.update_remote_source(&id, &name, &url, update_freq)?;
            println!("Updated remote source {} ({})", source.name, source.id);
        }
        RemoteCommand::Delete { id } => {
            service.delete_remote_source(&id)?;
            println!("Deleted remote source {id} and cleaned its region");
        }
        RemoteCommand::Fetch { id } => {
            let body = service.fetch_remote(&id)?;
            print_text(&body);
        }
        RemoteCommand::Apply { id } => {
            let source = service.remote_source(&id)?;
            service.apply_remote_to_system(&id)?;
            println!(
                "Merged {} into {}",
                source.name,
                service.hosts_path().display()
            );
        }
        RemoteCommand::Import { id } => {
            let config = service.create_config_from_remote(&id)?;
            println!("Imported config {} ({})", config.name, config.id);
        }
        RemoteCommand::UpdateAll => {
            print_refresh_summary(&service.update_all_remote_sources());
        }
        RemoteCommand::RefreshStartup => {
            print_refresh_summary(&service.run_startup_refresh());
        }
    }
    Ok(())
}

fn run_doctor(service: &HostsService) -> Result<()> {
    println!("{}", doctor_report(service));
    Ok(())
}

fn doctor_report(service: &HostsService) -> String {
    let mut lines = Vec::new();
    let hosts_path = service.hosts_path();
    let state = if !hosts_path.exists() {
        "missing, created on first read"
    } else if can_write(&hosts_path) {
        "writable"
    } else {
        "read-only, writes need elevation"
    };
    lines.push(format!("Hosts file: {} ({state})", hosts_path.display()));
    lines.push(format!("Data directory: {}", service.data_dir().display()));
    let configs = service.configs();
    lines.push(match service.active_config() {
        Some(active) => format!("Configs: {} (active: {})", configs.len(), active.name),
        None => format!("Configs: {} (none active)", configs.len()),
    });
    let stats = service.backup_stats();
    lines.push(format!(
        "Backups: {} ({} automatic, {} manual, {})",
        stats.total,
        stats.automatic,
        stats.manual,
        format_size(stats.total_size)
    ));
    let sources = service.remote_sources();
    let startup = sources
        .iter()
        .filter(|source| source.update_freq == UpdateFrequency::Startup)
        .count();
    lines.push(format!(
        "Remote sources: {} ({startup} refreshed at startup)",
        sources.len()
    ));
    lines.push(format!(
        "Backup retention: {} automatic snapshots",
        service.backup_retention()
    ));
    lines.join("\n")
}

fn print_refresh_summary(summary: &RefreshSummary) {
    if summary.updated.is_empty() && summary.failed.is_empty() {
        println!("Nothing to refresh.");
        return;
    }
    for name in &summary.updated {
        println!("Updated {name}");
    }
    if !summary.failed.is_empty() {
        eprintln!("Failed:");
        for name in &summary.failed {
            eprintln!("- {name}");
        }
    }
}

fn print_config_detail(config: &Config) {
    println!("ID: {}", config.id);
    println!("Name: {}", config.name);
    if !config.description.is_empty() {
        println!("Description: {}", config.description);
    }
    match config.source {
        ConfigSource::Local => println!("Source: local"),
        ConfigSource::Remote => println!(
            "Source: remote ({})",
            config.remote_url.as_deref().unwrap_or("url unknown")
        ),
    }
    println!("Active: {}", if config.is_active { "yes" } else { "no" });
    println!("Created: {}", format_timestamp(config.created_at));
    println!("Updated: {}", format_timestamp(config.updated_at));
    println!();
    print_text(&config.content);
}

fn print_backup_detail(backup: &Backup) {
    println!("ID: {}", backup.id);
    println!("Created: {}", format_timestamp(backup.timestamp));
    println!(
        "Kind: {}",
        if backup.is_automatic { "automatic" } else { "manual" }
    );
    println!("Size: {}", format_size(backup.size));
    println!("Hash: {}", backup.hash);
    if !backup.tags.is_empty() {
        println!("Tags: {}", backup.tags.join(", "));
    }
    if !backup.description.is_empty() {
        println!("Description: {}", backup.description);
    }
    println!();
    print_text(&backup.content);
}

/// Print content exactly, adding a final newline only when missing.
fn print_text(content: &str) {
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
}

fn load_content(args: ContentArgs) -> Result<String> {
    if let Some(path) = args.file {
        return read_content_file(&path);
    }
    args.content
        .context("either --file or --content is required")
}

fn read_content_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn can_write(path: &Path) -> bool {
    fs::OpenOptions::new().append(true).open(path).is_ok()
}
