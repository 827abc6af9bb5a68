use std::path::PathBuf;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ledger file location. Absent means `$HOME/todo-tasks.txt`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            enabled: true,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    /// How often `watch` prints the overdue digest. 0 disables it.
    #[serde(default = "default_overdue_check_minutes")]
    pub overdue_check_minutes: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            snooze_minutes: default_snooze_minutes(),
            overdue_check_minutes: default_overdue_check_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_week_start", with = "weekday_name")]
    pub week_start: Weekday,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            week_start: default_week_start(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Create the welcome todos when the stored collection is empty
    #[serde(default)]
    pub seed_samples: bool,
}

fn default_true() -> bool {
    true
}

fn default_snooze_minutes() -> u32 {
    10
}

fn default_overdue_check_minutes() -> u32 {
    60
}

fn default_week_start() -> Weekday {
    Weekday::Sun
}

/// Weekdays as lowercase English names (`"monday"`)
mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        let name = match day {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        };
        s.serialize_str(name)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<Weekday>()
            .map_err(|_| D::Error::custom(format!("unknown weekday: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.ledger.enabled);
        assert!(config.ledger.path.is_none());
        assert_eq!(config.reminders.snooze_minutes, 10);
        assert_eq!(config.reminders.overdue_check_minutes, 60);
        assert_eq!(config.view.week_start, Weekday::Sun);
        assert!(!config.store.seed_samples);
    }

    #[test]
    fn parses_all_sections() {
        let config: AppConfig = toml::from_str(
            r#"
[ledger]
enabled = false
path = "/tmp/tasks.txt"

[reminders]
snooze_minutes = 5

[view]
week_start = "monday"

[store]
seed_samples = true
"#,
        )
        .unwrap();
        assert!(!config.ledger.enabled);
        assert_eq!(config.ledger.path, Some(PathBuf::from("/tmp/tasks.txt")));
        assert_eq!(config.reminders.snooze_minutes, 5);
        assert_eq!(config.reminders.overdue_check_minutes, 60);
        assert_eq!(config.view.week_start, Weekday::Mon);
        assert!(config.store.seed_samples);
    }

    #[test]
    fn rejects_unknown_weekday() {
        assert!(toml::from_str::<AppConfig>("[view]\nweek_start = \"someday\"\n").is_err());
    }
}
