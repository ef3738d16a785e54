//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, HueWrap};

/// Command-line arguments shared by the workspace binaries.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
pub struct CliArgs {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hue boundary policy for HSV cycling.
    #[arg(long, value_enum)]
    pub hue_wrap: Option<HueWrap>,

    /// Leave texture wrap modes untouched.
    #[arg(long)]
    pub no_triplanar: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(wrap) = args.hue_wrap {
            self.effects.hue_wrap = wrap;
        }
        if args.no_triplanar {
            self.layers.triplanar = false;
        }
    }
}
