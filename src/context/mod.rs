//! Structured environment context attached to a beacon
//!
//! A [`ContextSource`] snapshots the environment at emit time (currently the
//! tmux pane that issued it). The resulting [`Context`] is persisted next to
//! the message by a [`ContextStore`] and read back for display.

pub mod exec;
pub mod store;
pub mod tmux;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use exec::{CommandExecutor, SystemExecutor};
pub use store::{ContextStore, FileContextStore};
pub use tmux::{TmuxContext, TmuxSource};

/// An immutable context snapshot
pub trait Context {
    /// Type tag of the source that produced it
    fn kind(&self) -> &'static str;

    /// Canonical serialized form
    fn to_json(&self) -> Result<Vec<u8>>;
}

/// Something that can produce a context from the current environment
pub trait ContextSource {
    fn get_context(&self) -> Result<Box<dyn Context>>;
}

/// Available context sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    /// tmux session, window and pane
    Tmux,
}

impl ContextKind {
    /// Production source for this kind
    pub fn source(self) -> Box<dyn ContextSource> {
        match self {
            Self::Tmux => Box::new(TmuxSource::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tmux => "tmux",
        }
    }
}
