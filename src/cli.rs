//! Command-line interface

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::{Parser, Subcommand};

use crate::beacon::Beacon;
use crate::config::Config;
use crate::context::{ContextKind, ContextSource, ContextStore, FileContextStore};
use crate::error::Result;
use crate::store::FileStore;
use crate::types::IdentityKey;
use crate::{file, render};

#[derive(Debug, Parser)]
#[command(name = "beacon")]
#[command(about = "Publish, list and clear status beacons for coding agents")]
#[command(version)]
pub struct Cli {
    /// Identity key (defaults to the parent process id)
    #[arg(long, env = "BEACON_ID", global = true)]
    pub id: Option<IdentityKey>,

    /// Override the state directory
    #[arg(
        long,
        global = true,
        value_parser = NonEmptyStringValueParser::new().map(PathBuf::from)
    )]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Emit a beacon signal
    Emit {
        /// Message to emit
        message: String,

        /// Attach context from this source
        #[arg(long, short = 'c', value_enum)]
        context: Option<ContextKind>,

        /// Do not attach context, even if configured
        #[arg(long, conflicts_with = "context")]
        no_context: bool,
    },

    /// Silence the beacon
    Silence,

    /// List all active beacons
    List,

    /// Display context recorded for a key
    Context {
        /// Identity key to read context for
        key: IdentityKey,

        /// Template for custom formatting, e.g. "{{.session_name}}:{{.pane_index}}"
        #[arg(long, short = 't')]
        template: Option<String>,
    },

    /// Show current config
    Config,
}

impl Cli {
    /// Run with the production context sources
    pub fn run(self, config: &Config, out: &mut dyn Write) -> Result<()> {
        self.run_with_sources(config, out, ContextKind::source)
    }

    /// Run, obtaining context sources from `sources`
    pub fn run_with_sources<F>(self, config: &Config, out: &mut dyn Write, sources: F) -> Result<()>
    where
        F: Fn(ContextKind) -> Box<dyn ContextSource>,
    {
        let Cli { id, dir, command } = self;
        let dir = match dir {
            Some(dir) => dir,
            None => file::base_dir()?,
        };

        match command {
            Commands::Emit {
                message,
                context,
                no_context,
            } => {
                let key = resolve_key(id)?;
                let kind = if no_context { None } else { context.or(config.context) };
                let mut beacon = coordinator(&dir, out);

                match kind {
                    Some(kind) => {
                        let ctx = sources(kind).get_context()?;
                        tracing::debug!(key = %key, kind = ctx.kind(), "emitting with context");
                        beacon.emit_with_context(&key, &message, Some(ctx.as_ref()))?;
                    }
                    None => beacon.emit(&key, &message)?,
                }
            }

            Commands::Silence => {
                let key = resolve_key(id)?;
                coordinator(&dir, out).silence(&key)?;
            }

            Commands::List => {
                coordinator(&dir, out).list()?;
            }

            Commands::Context { key, template } => {
                let data = FileContextStore::with_dir(&dir).read(&key)?;
                let template = template.or_else(|| config.template.clone());

                match template.as_deref().filter(|t| !t.is_empty()) {
                    Some(template) => {
                        let fields = render::fields(&data)?;
                        writeln!(out, "{}", render::render(template, &fields)?)?;
                    }
                    None => {
                        out.write_all(&data)?;
                        writeln!(out)?;
                    }
                }
            }

            Commands::Config => {
                let config_path = Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                writeln!(out, "Config file: {}", config_path)?;
                writeln!(out, "State dir: {}", dir.display())?;
                writeln!(out)?;
                writeln!(out, "context: {}", config.context.map_or("none", ContextKind::as_str))?;
                writeln!(out, "template: {:?}", config.template.as_deref().unwrap_or(""))?;
            }
        }

        Ok(())
    }
}

/// Explicit `--id`, else the invoking shell's pid
fn resolve_key(id: Option<IdentityKey>) -> Result<IdentityKey> {
    match id {
        Some(key) => Ok(key),
        None => parent_key(),
    }
}

fn coordinator<'a>(dir: &Path, out: &'a mut dyn Write) -> Beacon<&'a mut dyn Write> {
    Beacon::with_context_store(
        Box::new(FileStore::with_dir(dir)),
        Box::new(FileContextStore::with_dir(dir)),
        out,
    )
}

#[cfg(unix)]
fn parent_key() -> Result<IdentityKey> {
    Ok(IdentityKey::from_pid(std::os::unix::process::parent_id()))
}

#[cfg(not(unix))]
fn parent_key() -> Result<IdentityKey> {
    Err(crate::error::BeaconError::InvalidKey {
        key: String::new(),
        reason: "no parent process id on this platform; pass --id",
    })
}
