use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, File};
use icalagg_core::AggregatorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings file, e.g. ~/.config/icalagg/config.toml
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub core: CoreSettings,

    /// Rooms in column order
    #[serde(default)]
    pub rooms: Vec<RoomSettings>,

    pub files: FileSettings,
}

#[derive(Debug, Deserialize)]
pub struct CoreSettings {
    /// IANA timezone the HTML schedule is shown in
    pub timezone: String,

    /// Hours added to every incoming timestamp
    #[serde(default)]
    pub timezone_adjust_hours: i64,

    /// Use room names exactly as written instead of title-casing them
    #[serde(default)]
    pub keep_room_names: bool,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomSettings {
    pub name: String,
    /// http(s):// or file:// URL, or a plain path
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSettings {
    /// Where to write the merged calendar
    pub ical: PathBuf,
    /// Where to write the HTML schedule
    pub html: PathBuf,
    /// Written before the schedule grid instead of the default stylesheet link
    pub htmlheader: Option<PathBuf>,
    /// Written after the schedule grid
    pub htmlfooter: Option<PathBuf>,
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if !path.exists() {
            anyhow::bail!(
                "Config file not found at {}\n\n\
                Create it with your timezone, rooms and output files:\n\n\
                [core]\n\
                timezone = \"Europe/Stockholm\"\n\n\
                [[rooms]]\n\
                name = \"Room A\"\n\
                url = \"https://example.org/room-a.ics\"\n\n\
                [files]\n\
                ical = \"schedule.ics\"\n\
                html = \"schedule.html\"",
                path.display()
            );
        }

        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_path()))
            .build()
            .with_context(|| format!("Failed to read config file at {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        Ok(settings)
    }

    pub fn aggregator_config(&self) -> Result<AggregatorConfig> {
        let tz: Tz = self
            .core
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.core.timezone, e))?;

        Ok(AggregatorConfig::new(tz, self.core.timezone_adjust_hours))
    }

    /// Room name as shown in the schedule
    pub fn room_name(&self, room: &RoomSettings) -> String {
        if self.core.keep_room_names {
            room.name.clone()
        } else {
            capwords(&room.name)
        }
    }
}

/// Get the config file path (~/.config/icalagg/config.toml)
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("icalagg");
    Ok(config_dir.join("config.toml"))
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Capitalize each whitespace-separated word and lowercase the rest of it.
fn capwords(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn capwords_title_cases_each_word() {
        assert_eq!(capwords("room a"), "Room A");
        assert_eq!(capwords("MAIN   hall"), "Main Hall");
        assert_eq!(capwords("  "), "");
    }

    #[test]
    fn loads_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[core]
timezone = "Europe/Stockholm"
timezone_adjust_hours = -1
fetch_timeout_secs = 5

[[rooms]]
name = "room b"
url = "https://example.org/b.ics"

[[rooms]]
name = "room a"
url = "a.ics"

[files]
ical = "out/schedule.ics"
html = "out/schedule.html"
htmlheader = "header.html"
"#,
        );

        let settings = Settings::load(Some(&path)).unwrap();
        let names: Vec<String> = settings.rooms.iter().map(|r| settings.room_name(r)).collect();
        assert_eq!(names, vec!["Room B", "Room A"]);
        assert_eq!(settings.rooms[1].url, "a.ics");
        assert_eq!(settings.core.fetch_timeout_secs, 5);
        assert_eq!(settings.files.htmlheader, Some(PathBuf::from("header.html")));
        assert_eq!(settings.files.htmlfooter, None);

        let agg = settings.aggregator_config().unwrap();
        assert_eq!(agg.display_tz, chrono_tz::Europe::Stockholm);
        assert_eq!(agg.adjust_hours, -1);
    }

    #[test]
    fn defaults_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[core]
timezone = "UTC"
keep_room_names = true

[[rooms]]
name = "room a"
url = "a.ics"

[files]
ical = "schedule.ics"
html = "schedule.html"
"#,
        );

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.core.timezone_adjust_hours, 0);
        assert_eq!(settings.core.fetch_timeout_secs, 30);
        assert_eq!(settings.room_name(&settings.rooms[0]), "room a");
    }

    #[test]
    fn rejects_unknown_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[core]
timezone = "Mars/Olympus_Mons"

[files]
ical = "schedule.ics"
html = "schedule.html"
"#,
        );

        let settings = Settings::load(Some(&path)).unwrap();
        assert!(settings.rooms.is_empty());
        let err = settings.aggregator_config().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
