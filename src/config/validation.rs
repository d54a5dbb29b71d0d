//! Configuration and target validation.

use chrono::{NaiveDate, TimeZone, Utc};
use regex::Regex;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fs::TemplateNamer;
use crate::media::TimeWindow;

/// Validate a loaded configuration before a run starts.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.options.jobs == 0 {
        return Err(Error::ConfigValidation {
            field: "jobs".into(),
            message: "at least one download worker is required".into(),
        });
    }

    // Surfaces template errors before any network traffic happens.
    TemplateNamer::new(&config.options.template)?;

    if config.network.timeout_secs == 0 {
        return Err(Error::ConfigValidation {
            field: "timeout_secs".into(),
            message: "request timeout cannot be zero".into(),
        });
    }

    Ok(())
}

/// Extract a post shortcode from a bare code or a post URL.
pub fn parse_post_shortcode(input: &str) -> Result<String> {
    let code_re = Regex::new(r"^[A-Za-z0-9_-]{5,32}$").expect("static regex");
    if code_re.is_match(input) {
        return Ok(input.to_string());
    }

    if let Ok(url) = Url::parse(input) {
        let mut segments = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()))
            .into_iter()
            .flatten();
        if segments.next() == Some("p") {
            if let Some(code) = segments.next() {
                if code_re.is_match(code) {
                    return Ok(code.to_string());
                }
            }
        }
    }

    Err(Error::InvalidTarget(format!(
        "'{}' is neither a post shortcode nor a post URL",
        input
    )))
}

/// Parse a `START:END` time window, either side optional.
///
/// `START` is the more recent bound, matching reverse-chronological feeds;
/// both are `YYYY-MM-DD` dates. The start day is included up to its last
/// second, the end day from its first.
pub fn parse_time_window(input: &str) -> Result<TimeWindow> {
    let (start_raw, end_raw) = input.split_once(':').ok_or_else(|| {
        Error::InvalidTarget(format!("time window '{}' must look like START:END", input))
    })?;

    let parse_date = |raw: &str| -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| Error::InvalidTarget(format!("bad date '{}': {}", raw, e)))
    };

    let start = if start_raw.is_empty() {
        None
    } else {
        let date = parse_date(start_raw)?;
        Some(
            Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59).expect("valid time")),
        )
    };

    let end = if end_raw.is_empty() {
        None
    } else {
        let date = parse_date(end_raw)?;
        Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("valid time")))
    };

    TimeWindow::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_defaults_pass() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_zero_jobs() {
        let config: Config = toml::from_str("[options]\njobs = 0\n").unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_validate_config_rejects_bad_template() {
        let config: Config = toml::from_str("[options]\ntemplate = \"no-keys\"\n").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_post_shortcode_bare() {
        assert_eq!(parse_post_shortcode("BXyZ-12_ab").unwrap(), "BXyZ-12_ab");
    }

    #[test]
    fn test_parse_post_shortcode_url() {
        assert_eq!(
            parse_post_shortcode("https://www.instagram.com/p/BXyZ12345/").unwrap(),
            "BXyZ12345"
        );
    }

    #[test]
    fn test_parse_post_shortcode_rejects_garbage() {
        assert!(parse_post_shortcode("ab").is_err());
        assert!(parse_post_shortcode("https://example.com/u/whatever/").is_err());
    }

    #[test]
    fn test_parse_time_window() {
        let window = parse_time_window("2024-05-01:2024-04-01").unwrap();
        assert!(window.start.unwrap() > window.end.unwrap());

        let open_end = parse_time_window("2024-05-01:").unwrap();
        assert!(open_end.start.is_some());
        assert!(open_end.end.is_none());

        assert!(parse_time_window("2024-05-01").is_err());
        assert!(parse_time_window("2024-04-01:2024-05-01").is_err());
    }
}
