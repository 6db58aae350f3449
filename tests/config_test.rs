use std::fs;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;
    use pager_interrupts::config::Config;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        assert_eq!(config.api.base_url, "https://api.pagerduty.com");
        assert_eq!(config.api.page_limit, 100);
        assert_eq!(config.api.urgencies, vec!["high"]);

        assert!(config.query.team_ids.is_empty());

        assert_eq!(config.hours.sleep_start, 21);
        assert_eq!(config.hours.sleep_end, 8);
        assert_eq!(config.hours.business_start, 8);
        assert_eq!(config.hours.business_end, 19);
        assert_eq!(config.hours.fallback_time_zone, "America/Denver");
        assert_eq!(config.hours.slo_max_sleep_interruptions_per_week, 1);

        assert_eq!(config.output.csv_path.to_str(), Some("report.csv"));
        assert_eq!(config.output.description_width, 50);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.api.page_limit = 101;
        assert!(config.validate().is_err());

        config = Config::default();
        config.hours.sleep_start = 24;
        assert!(config.validate().is_err());

        config = Config::default();
        config.api.urgencies.clear();
        assert!(config.validate().is_err());

        config = Config::default();
        config.output.description_width = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.hours.sleep_start = 6;
        config.hours.sleep_end = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_timestamp_format_is_rejected() {
        let mut config = Config::default();
        config.output.timestamp_format = "%Y-%m-%d %Q".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unsupported timestamp format"));

        config.output.timestamp_format = "%d/%m/%Y %H:%M %:z".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_wrapping_sleep_window_keeps_midday_business_hours() {
        use chrono::Weekday;
        use pager_interrupts::HourClass;

        let mut config = Config::default();
        config.hours.sleep_start = 0;
        config.hours.sleep_end = 6;
        assert!(config.validate().is_ok());

        let rules = config.hours.rules();
        assert_eq!(rules.classify(12, Weekday::Wed), HourClass::BusinessHours);
        assert_eq!(rules.classify(3, Weekday::Wed), HourClass::SleepHours);
        assert_eq!(rules.classify(22, Weekday::Wed), HourClass::OffHours);
    }

    #[test]
    fn test_load_records_config_source() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("pager-interrupts.toml");
        fs::write(&config_path, "[api]\npage_limit = 50\n").expect("Failed to write test config");

        let config = Config::load(Some(&config_path)).expect("Failed to load config");

        assert_eq!(config.source.as_deref(), Some(config_path.as_path()));
        assert!(Config::default().source.is_none());
    }

    #[test]
    fn test_config_file_loading() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("test-config.toml");

        let test_config = r#"
[logging]
level = "DEBUG"
format = "json"

[api]
page_limit = 25

[query]
team_ids = ["PTV792K", "PTBNXW0"]
ignored_user_ids = ["PJX59OJ"]

[hours]
fallback_time_zone = "America/Chicago"
slo_max_sleep_interruptions_per_week = 2

[output]
csv_path = "interrupts.csv"
        "#;

        fs::write(&config_path, test_config).expect("Failed to write test config");

        let config = Config::load_from_file(&config_path).expect("Failed to load config");

        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.logging.format, "json");
        // unspecified keys keep their defaults
        assert_eq!(config.logging.output, "console");
        assert_eq!(config.api.page_limit, 25);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.query.team_ids, vec!["PTV792K", "PTBNXW0"]);
        assert_eq!(config.query.ignored_user_ids, vec!["PJX59OJ"]);
        assert_eq!(config.hours.fallback_time_zone, "America/Chicago");
        assert_eq!(config.hours.sleep_start, 21);
        assert_eq!(config.hours.slo_max_sleep_interruptions_per_week, 2);
        assert_eq!(config.output.csv_path.to_str(), Some("interrupts.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[api]\npage_limit = \"many\"\n").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();

        let toml_string = toml::to_string_pretty(&config).expect("Failed to serialize to TOML");
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("[api]"));
        assert!(toml_string.contains("[hours]"));
        assert!(toml_string.contains("[output]"));

        let deserialized: Config = toml::from_str(&toml_string).expect("Failed to deserialize TOML");
        assert_eq!(config.api.base_url, deserialized.api.base_url);
        assert_eq!(config.hours.business_end, deserialized.hours.business_end);
    }
}
