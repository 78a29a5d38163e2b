// SPDX-License-Identifier: GPL-3.0-only

//! smb-shares - manage Samba shares backed by per-directory quotas
//!
//! Thin presentation layer over the share engine: every subcommand maps
//! onto one engine operation, and the share list shown after a mutation
//! is always the engine's freshly reloaded view, never a local merge.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use shares_engine::{engine, ShareEngine};
use shares_types::{
    compare_sizes, from_kilobytes, AppSettings, Share, ShareDraft, SortKey, Theme,
};

const DEFAULT_LOG_FILTER: &str = "shares_cli=info,shares_engine=info,shares_sys=info,warn";

#[derive(Debug, Parser)]
#[command(name = "smb-shares")]
#[command(about = "Manage Samba shares with per-directory quotas")]
struct Args {
    /// Application settings file
    #[arg(long, default_value = engine::DEFAULT_SETTINGS_PATH, global = true)]
    settings: PathBuf,

    /// Main Samba configuration file
    #[arg(long, default_value = engine::DEFAULT_MAIN_CONF, global = true)]
    smb_conf: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show whether the main configuration loads managed shares
    Status,
    /// Provision the record directory and activate the include directive
    Enable,
    /// List shares
    List {
        #[arg(long, default_value = "name")]
        sort: SortKey,
        #[arg(long)]
        json: bool,
    },
    /// Add a share
    Add {
        #[arg(long)]
        name: String,
        /// Exported directory; defaults to the configured parent path
        /// plus mountpoint name plus share name
        #[arg(long)]
        path: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
        #[arg(long)]
        guest_ok: bool,
        #[arg(long)]
        read_only: bool,
        /// Hide the share from network browsing
        #[arg(long)]
        hidden: bool,
        /// Quota, e.g. 100KB, 500MB, 1G, 2TB; empty means no quota
        #[arg(long, default_value = "")]
        quota: String,
        /// Raw configuration lines appended verbatim to the record
        #[arg(long, default_value = "")]
        advanced: String,
    },
    /// Update an existing share
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        guest_ok: Option<bool>,
        #[arg(long)]
        read_only: Option<bool>,
        #[arg(long)]
        browsable: Option<bool>,
        #[arg(long)]
        quota: Option<String>,
        #[arg(long)]
        advanced: Option<String>,
    },
    /// Delete a share
    Remove { id: Uuid },
    /// Show or change application settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Show usage of the filesystem backing the configured paths
    Usage,
    /// Validate the composed configuration and reload the service
    Reload,
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        base_path: Option<String>,
        #[arg(long)]
        parent_path: Option<String>,
        #[arg(long)]
        mountpoint_name: Option<String>,
        #[arg(long)]
        theme: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let engine = ShareEngine::new(&args.settings, &args.smb_conf);

    if mutates(&args.command) && unsafe { libc::geteuid() } != 0 {
        tracing::warn!("Not running as root; writes to system paths will likely fail");
    }

    match args.command {
        Command::Status => status(&engine),
        Command::Enable => enable(&engine),
        Command::List { sort, json } => list(&engine, sort, json),
        Command::Add {
            name,
            path,
            comment,
            guest_ok,
            read_only,
            hidden,
            quota,
            advanced,
        } => {
            let settings = engine.settings()?;
            let path = path.unwrap_or_else(|| settings.suggested_share_path(&name));
            let shares = engine.add_share(ShareDraft {
                name,
                path,
                comment,
                guest_ok,
                read_only,
                browsable: !hidden,
                quota,
                advanced_settings: advanced,
            })?;
            print_table(&shares);
            Ok(())
        }
        Command::Update {
            id,
            name,
            path,
            comment,
            guest_ok,
            read_only,
            browsable,
            quota,
            advanced,
        } => {
            let current = engine
                .shares()?
                .into_iter()
                .find(|share| share.id == id)
                .ok_or_else(|| anyhow::anyhow!("no share with id {id}"))?;

            let edited = Share {
                id,
                name: name.unwrap_or(current.name),
                path: path.unwrap_or(current.path),
                comment: comment.unwrap_or(current.comment),
                guest_ok: guest_ok.unwrap_or(current.guest_ok),
                read_only: read_only.unwrap_or(current.read_only),
                browsable: browsable.unwrap_or(current.browsable),
                quota: quota.unwrap_or(current.quota),
                used: None,
                advanced_settings: advanced.unwrap_or(current.advanced_settings),
            };

            let shares = engine.update_share(edited)?;
            print_table(&shares);
            Ok(())
        }
        Command::Remove { id } => {
            let shares = engine.delete_share(id)?;
            print_table(&shares);
            Ok(())
        }
        Command::Settings { command } => settings(&engine, command),
        Command::Usage => usage(&engine),
        Command::Reload => {
            engine.commit_and_reload()?;
            println!("Configuration validated and service reloaded.");
            Ok(())
        }
    }
}

fn mutates(command: &Command) -> bool {
    !matches!(
        command,
        Command::Status
            | Command::List { .. }
            | Command::Usage
            | Command::Settings {
                command: SettingsCommand::Show,
            }
    )
}

fn status(engine: &ShareEngine) -> Result<()> {
    let settings = engine.settings()?;
    if engine.check_configured()? {
        let shares = engine.shares()?;
        println!(
            "Configured: records under {} are active ({} share(s)).",
            settings.share_config_base_path,
            shares.len()
        );
    } else {
        println!(
            "Not configured: the main configuration does not load records from {}.",
            settings.share_config_base_path
        );
        println!("Run `smb-shares enable` to activate share management.");
    }
    Ok(())
}

fn enable(engine: &ShareEngine) -> Result<()> {
    engine.create_config_directories()?;
    engine.enable_config()?;
    engine.commit_and_reload()?;
    let shares = engine.shares()?;
    println!("Share management enabled ({} share(s)).", shares.len());
    Ok(())
}

fn list(engine: &ShareEngine, sort: SortKey, json: bool) -> Result<()> {
    let mut shares = engine.shares()?;

    shares.sort_by(|a, b| match sort {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Path => a.path.cmp(&b.path),
        SortKey::Quota => compare_sizes(&a.quota, &b.quota),
        SortKey::Used => compare_sizes(
            a.used.as_deref().unwrap_or(""),
            b.used.as_deref().unwrap_or(""),
        ),
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&shares)?);
    } else {
        print_table(&shares);
    }
    Ok(())
}

fn print_table(shares: &[Share]) {
    if shares.is_empty() {
        println!("No shares configured.");
        return;
    }

    println!(
        "{:<36}  {:<20} {:<30} {:>10} {:>10}",
        "ID", "NAME", "PATH", "QUOTA", "USED"
    );
    for share in shares {
        let quota = if share.quota.is_empty() {
            "none".to_string()
        } else {
            share.quota.clone()
        };
        let used = share
            .used
            .as_deref()
            .map(from_kilobytes)
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<36}  {:<20} {:<30} {:>10} {:>10}",
            share.id, share.name, share.path, quota, used
        );
    }
}

fn settings(engine: &ShareEngine, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = engine.settings()?;
            println!("share_config_base_path = {}", settings.share_config_base_path);
            println!("default_parent_path = {}", settings.default_parent_path);
            println!(
                "default_mountpoint_name = {}",
                settings.default_mountpoint_name
            );
            println!(
                "theme = {}",
                match settings.theme {
                    Theme::Dark => "dark",
                    Theme::Light => "light",
                }
            );
            Ok(())
        }
        SettingsCommand::Set {
            base_path,
            parent_path,
            mountpoint_name,
            theme,
        } => {
            let current = engine.settings()?;
            let edited = AppSettings {
                share_config_base_path: base_path.unwrap_or(current.share_config_base_path),
                default_parent_path: parent_path.unwrap_or(current.default_parent_path),
                default_mountpoint_name: mountpoint_name
                    .unwrap_or(current.default_mountpoint_name),
                theme: match theme.as_deref() {
                    Some("dark") => Theme::Dark,
                    Some("light") => Theme::Light,
                    Some(other) => anyhow::bail!("unknown theme '{other}'"),
                    None => current.theme,
                },
            };
            engine.save_settings(&edited)?;
            println!("Settings saved.");
            Ok(())
        }
    }
}

fn usage(engine: &ShareEngine) -> Result<()> {
    let settings = engine.settings()?;
    let usage = engine.filesystem_usage(&settings);

    println!("Mountpoint: {}", usage.mountpoint);
    println!("Filesystem: {}", usage.filesystem);
    println!("Size:  {}", from_kilobytes(&usage.size));
    println!("Avail: {}", from_kilobytes(&usage.available));
    println!(
        "Used:  {} ({})",
        from_kilobytes(&usage.used),
        usage.used_percent
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_covers_the_workspace_crates() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).expect("default filter must parse");
        let rendered = filter.to_string();
        for target in ["shares_cli", "shares_engine", "shares_sys"] {
            assert!(rendered.contains(target), "filter must enable {target}");
        }
    }
}
