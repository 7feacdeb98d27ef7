use chrono::NaiveDate;
use serde::Deserialize;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::iter::FromIterator;
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind, Result};
use crate::selection::NavigationPolicy;

const CONFIG_PATH_ENV_VAR: &str = "MEMOCAL_CONFIG_FILE";
const APP_DIR_NAME: &str = "memocal";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env: Option<PathBuf> = env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from);

    let home = if let Some(dir) = dirs::home_dir() {
        dir
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "Unable to find home directory",
        ));
    };

    let home_config = PathBuf::from_iter([&home, &PathBuf::from(".memocal.toml")].iter());

    let config_xdg = if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from_iter([dir, APP_DIR_NAME.to_string(), "config.toml".to_string()].iter())
    } else {
        PathBuf::from_iter(
            [
                home.as_path(),
                Path::new(".config"),
                Path::new(APP_DIR_NAME),
                Path::new("config.toml"),
            ]
            .iter(),
        )
    };

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub today_char: char,
    pub selected_char: char,
    pub memo_char: char,
    pub other_month_char: char,
    pub month_format: String,
    pub date_format: String,
}

impl Theme {
    fn validate(&self) -> Result<()> {
        // formats are only usable if a plain date renders with them
        let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);
        for format in [&self.month_format, &self.date_format].iter() {
            let mut rendered = String::new();
            if write!(rendered, "{}", sample.format(format)).is_err() {
                return Err(Error::new(
                    ErrorKind::ConfigParse,
                    &format!("invalid date format '{}'", format),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            today_char: '*',
            selected_char: '>',
            memo_char: '+',
            other_month_char: '.',
            month_format: "%B %Y".to_owned(),
            date_format: "%B %-d, %Y".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub navigation: NavigationPolicy,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            navigation: NavigationPolicy::default(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|err| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!("{}: {}", path.display(), err),
            )
        })?;

        config.theme.validate()?;
        Ok(config)
    }
}

/// Uses `path` if given, otherwise the first existing default location.
/// Falls back to the built-in defaults when no file exists.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_path(path);
    }

    let locations = find_configfile_locations()?;
    match locations.iter().find(|p| p.is_file()) {
        Some(path) => {
            log::info!("Using config file '{}'", path.display());
            Config::from_path(path)
        }
        None => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
