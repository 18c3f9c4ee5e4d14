use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use crate::description::RenderSettings;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Renders a TOML scene file with a recursive ray tracer.
///
/// Flags override the `[render]` table of the scene file.
#[derive(Debug, Parser)]
#[command(name = "whitted", version)]
pub struct Args {
    /// Scene description (TOML)
    pub scene: PathBuf,

    /// Output image, format picked from the extension
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Maximum number of mirror bounces per primary ray
    #[arg(short, long)]
    pub bounces: Option<u32>,

    /// Enable shadow rays
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "no_shadows")]
    pub shadows: bool,

    /// Disable shadow rays
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "shadows")]
    pub no_shadows: bool,

    /// Worker threads, defaults to one per core
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Layers the command line on top of the scene file's settings.
    pub fn apply(&self, settings: &mut RenderSettings) -> Result<()> {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(bounces) = self.bounces {
            settings.max_bounces = bounces;
        }
        if self.shadows {
            settings.shadows = true;
        }
        if self.no_shadows {
            settings.shadows = false;
        }

        if settings.width == 0 || settings.height == 0 {
            return Err(Error::InvalidSettings(format!(
                "image size must be non-zero, got {}x{}",
                settings.width, settings.height
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidSettings("thread count must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_command() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_file() {
        let args = Args::parse_from(["whitted", "scene.toml", "--width", "10", "-b", "0", "--no-shadows"]);
        let mut settings = RenderSettings::default();
        args.apply(&mut settings).unwrap();
        assert_eq!(settings.width, 10);
        assert_eq!(settings.height, 480);
        assert_eq!(settings.max_bounces, 0);
        assert!(!settings.shadows);
        assert_eq!(args.output, PathBuf::from("output.png"));
    }

    #[test]
    fn shadows_can_be_forced_on() {
        let args = Args::parse_from(["whitted", "scene.toml", "--shadows"]);
        let mut settings = RenderSettings {
            shadows: false,
            ..Default::default()
        };
        args.apply(&mut settings).unwrap();
        assert!(settings.shadows);
    }

    #[test]
    fn zero_size_is_rejected() {
        let args = Args::parse_from(["whitted", "scene.toml", "--height", "0"]);
        let mut settings = RenderSettings::default();
        assert!(matches!(args.apply(&mut settings), Err(Error::InvalidSettings(_))));
    }
}
