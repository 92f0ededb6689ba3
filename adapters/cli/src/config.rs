//! Command-line flags and the optional TOML settings file.
//!
//! Flags win over the file, and the file wins over the built-in defaults.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use grinch_smasher_system_spawning::Config as SpawnConfig;
use serde::Deserialize;

const DEFAULT_SESSIONS: u32 = 1;
const DEFAULT_ACCURACY: f64 = 0.9;
const DEFAULT_REACTION_MS: u64 = 400;
const DEFAULT_FRAME_MS: u64 = 100;
const DEFAULT_PHOTO: &str = "selfie.jpg";
const DEFAULT_HIGH_SCORE_FILE: &str = "grinch_smasher_highscore.toml";

/// Plays Grinch Smasher headlessly with a simulated player.
#[derive(Debug, Default, Parser)]
#[command(name = "grinch-smasher", version, about)]
pub(crate) struct Args {
    /// TOML file providing defaults for the other flags.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Seed for the spawn schedule and the simulated player.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Number of sessions played back to back with the same photo.
    #[arg(long)]
    pub(crate) sessions: Option<u32>,
    /// Probability that the player leaves a present alone.
    #[arg(long)]
    pub(crate) accuracy: Option<f64>,
    /// Delay before the player reacts to a new item, in milliseconds.
    #[arg(long)]
    pub(crate) reaction_ms: Option<u64>,
    /// Virtual time advanced per frame, in milliseconds.
    #[arg(long)]
    pub(crate) frame_ms: Option<u64>,
    /// Reference of the photo handed to the session.
    #[arg(long)]
    pub(crate) photo: Option<String>,
    /// File the best score is persisted to.
    #[arg(long, value_name = "PATH")]
    pub(crate) high_score_file: Option<PathBuf>,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Values read from the optional settings file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    seed: Option<u64>,
    sessions: Option<u32>,
    accuracy: Option<f64>,
    reaction_ms: Option<u64>,
    frame_ms: Option<u64>,
    photo: Option<String>,
    high_score_file: Option<PathBuf>,
}

impl FileConfig {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }
}

/// Fully resolved runner settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) seed: u64,
    pub(crate) sessions: u32,
    pub(crate) accuracy: f64,
    pub(crate) reaction: Duration,
    pub(crate) frame: Duration,
    pub(crate) photo: String,
    pub(crate) high_score_file: PathBuf,
}

impl Settings {
    /// Merges the flags with the settings file they point at.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: &Args, file: FileConfig) -> Result<Self> {
        let sessions = args.sessions.or(file.sessions).unwrap_or(DEFAULT_SESSIONS);
        if sessions == 0 {
            bail!("at least one session must be played");
        }

        let accuracy = args.accuracy.or(file.accuracy).unwrap_or(DEFAULT_ACCURACY);
        if !(0.0..=1.0).contains(&accuracy) {
            bail!("accuracy must lie within 0.0..=1.0, got {accuracy}");
        }

        let frame_ms = args.frame_ms.or(file.frame_ms).unwrap_or(DEFAULT_FRAME_MS);
        if frame_ms == 0 {
            bail!("frame length must be at least one millisecond");
        }

        Ok(Self {
            seed: args
                .seed
                .or(file.seed)
                .unwrap_or_else(|| SpawnConfig::default().rng_seed()),
            sessions,
            accuracy,
            reaction: Duration::from_millis(
                args.reaction_ms
                    .or(file.reaction_ms)
                    .unwrap_or(DEFAULT_REACTION_MS),
            ),
            frame: Duration::from_millis(frame_ms),
            photo: args
                .photo
                .clone()
                .or(file.photo)
                .unwrap_or_else(|| DEFAULT_PHOTO.to_owned()),
            high_score_file: args
                .high_score_file
                .clone()
                .or(file.high_score_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HIGH_SCORE_FILE)),
        })
    }
}
