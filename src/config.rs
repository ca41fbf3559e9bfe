use {
    anyhow::Context,
    serde::Deserialize,
    std::{
        env,
        ffi::OsString,
        fs::File,
        io::{ErrorKind, Read},
        path::PathBuf,
    },
};

/// Settings of one run of the program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The file the contacts are stored in.
    pub store_path: PathBuf,
    /// Log filter directive from the config file, e.g. `debug` or `contacts=info`.
    pub log: Option<String>,
}

impl Config {
    /// Combines the store path given on the command line with the config file.
    ///
    /// The command line wins over the config file, which wins over `$HOME/.contacts`.
    pub fn resolve(cli_store_path: Option<PathBuf>, file: Option<ConfigFile>) -> Self {
        let file = file.unwrap_or_default();
        let store_path = cli_store_path
            .or(file.store_path)
            .unwrap_or_else(|| default_store_path(env::var_os("HOME")));

        Self {
            store_path,
            log: file.log,
        }
    }
}

/// The content of the `contacts.toml` config file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub store_path: Option<PathBuf>,
    pub log: Option<String>,
}

/// Reads the config file.
///
/// If successful, returns the parsed config file. Returns [`None`] if the config file could not be
/// found.
pub fn obtain_config() -> anyhow::Result<Option<ConfigFile>> {
    let config_path = match config_file_path() {
        Some(config_path) => config_path,
        None => return Ok(None),
    };

    match File::open(&config_path) {
        Ok(mut file) => {
            let mut config = String::new();
            file.read_to_string(&mut config)
                .context("Failed to read config file")?;

            parse_config(&config)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))
                .map(Some)
        }
        Err(error) => match error.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(error).context("Failed to open config file"),
        },
    }
}

fn parse_config(config: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(config)
}

/// Gets the path where the `contacts.toml` config file is expected.
///
/// Returns [`None`] if the config directory could not be found.
fn config_file_path() -> Option<PathBuf> {
    let mut path = config_dir(env::var_os("XDG_CONFIG_HOME"), env::var_os("HOME"))?;
    path.push("contacts.toml");
    Some(path)
}

/// Gets the config directory.
fn config_dir(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    // Return $XDG_CONFIG_HOME if it is set,
    // otherwise return $HOME/.config if HOME is set,
    // otherwise return None
    xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.map(|home_dir| {
                let mut dir = PathBuf::from(home_dir);
                dir.push(".config");
                dir
            })
        })
}

/// `$HOME/.contacts`, or `.contacts` in the working directory without a home directory.
fn default_store_path(home: Option<OsString>) -> PathBuf {
    match home {
        Some(home_dir) => {
            let mut path = PathBuf::from(home_dir);
            path.push(".contacts");
            path
        }
        None => PathBuf::from(".contacts"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_wins() {
        let file = ConfigFile {
            store_path: Some(PathBuf::from("/from/config")),
            log: Some("debug".to_owned()),
        };
        let config = Config::resolve(Some(PathBuf::from("/from/cli")), Some(file));

        assert_eq!(config.store_path, PathBuf::from("/from/cli"));
        assert_eq!(config.log.as_deref(), Some("debug"));
    }

    #[test]
    fn test_config_file_wins_over_default() {
        let file = parse_config("store_path = \"/data/contacts.json\"\n").unwrap();
        let config = Config::resolve(None, Some(file));

        assert_eq!(config.store_path, PathBuf::from("/data/contacts.json"));
        assert_eq!(config.log, None);
    }

    #[test]
    fn test_empty_config_file() {
        let file = parse_config("").unwrap();
        assert!(file.store_path.is_none());
        assert!(file.log.is_none());
    }

    #[test]
    fn test_malformed_config_file() {
        assert!(parse_config("store_path = ").is_err());
        assert!(parse_config("store_path = 3").is_err());
    }

    #[test]
    fn test_default_store_path() {
        assert_eq!(
            default_store_path(Some(OsString::from("/home/me"))),
            PathBuf::from("/home/me/.contacts")
        );
        assert_eq!(default_store_path(None), PathBuf::from(".contacts"));
    }

    #[test]
    fn test_config_dir_lookup() {
        assert_eq!(
            config_dir(Some("/xdg".into()), Some("/home/me".into())),
            Some(PathBuf::from("/xdg"))
        );
        assert_eq!(
            config_dir(Some("".into()), Some("/home/me".into())),
            Some(PathBuf::from("/home/me/.config"))
        );
        assert_eq!(config_dir(None, None), None);
    }
}
