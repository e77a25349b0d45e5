//! Process-level configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `SPYSTER_HOST` | `0.0.0.0` |
//! | `SPYSTER_PORT` | `3001` |
//! | `SPYSTER_CONTENT_DIR` | unset (built-in pack only) |
//! | `SPYSTER_ROLE_REPEAT` | `cycle` |
//! | `SPYSTER_SPY_GUESS_CORRECT_POINTS` | `10` |
//! | `SPYSTER_SPY_GUESS_WRONG_PENALTY` | `5` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::game::EngineSettings;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub content_dir: Option<PathBuf>,
    pub settings: EngineSettings,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SPYSTER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "SPYSTER_PORT")?.unwrap_or(3001);
        let content_dir = lookup("SPYSTER_CONTENT_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let mut settings = EngineSettings::default();
        if let Some(policy) = parse_var(&lookup, "SPYSTER_ROLE_REPEAT")? {
            settings.role_repeat = policy;
        }
        if let Some(points) = parse_var(&lookup, "SPYSTER_SPY_GUESS_CORRECT_POINTS")? {
            settings.scoring.spy_guess_correct_points = points;
        }
        if let Some(points) = parse_var(&lookup, "SPYSTER_SPY_GUESS_WRONG_PENALTY")? {
            settings.scoring.spy_guess_wrong_penalty = points;
        }

        Ok(Self {
            host,
            port,
            content_dir,
            settings,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::config(format!("{name} has an invalid value '{raw}': {e}"))),
    }
}
