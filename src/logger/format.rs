//! Access log records
//!
//! One record per request/response exchange, rendered as a `combined`,
//! `common` (CLF) or `json` line.

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::AccessLogFormat;

/// What the access log knows about one exchange
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub client: IpAddr,
    pub received_at: DateTime<Local>,
    pub method: String,
    /// Request target as sent: path plus `?query` when present
    pub target: String,
    /// `1.0`, `1.1`, ...
    pub version: &'static str,
    pub status: u16,
    pub bytes_sent: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub elapsed: Duration,
}

impl AccessRecord {
    pub fn render(&self, layout: AccessLogFormat) -> String {
        match layout {
            AccessLogFormat::Common => self.clf(),
            AccessLogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.clf(),
                dash_if_none(self.referer.as_deref()),
                dash_if_none(self.user_agent.as_deref()),
            ),
            AccessLogFormat::Json => serde_json::json!({
                "client": self.client.to_string(),
                "time": self.received_at.to_rfc3339(),
                "method": self.method,
                "target": self.target,
                "version": self.version,
                "status": self.status,
                "bytes_sent": self.bytes_sent,
                "referer": self.referer,
                "user_agent": self.user_agent,
                "elapsed_us": u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX),
            })
            .to_string(),
        }
    }

    /// `host - - [time] "METHOD target HTTP/v" status bytes`
    fn clf(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.client,
            self.received_at.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.target,
            self.version,
            self.status,
            self.bytes_sent,
        )
    }
}

fn dash_if_none(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge_fetch() -> AccessRecord {
        AccessRecord {
            client: "192.168.1.1".parse().unwrap(),
            received_at: Local::now(),
            method: "GET".to_string(),
            target: "/octocat/Hello-World/issues/1?label=Votes".to_string(),
            version: "1.1",
            status: 200,
            bytes_sent: 1234,
            referer: Some("https://github.com/octocat/Hello-World".to_string()),
            user_agent: Some("github-camo".to_string()),
            elapsed: Duration::from_micros(1500),
        }
    }

    #[test]
    fn test_combined_line() {
        let line = badge_fetch().render(AccessLogFormat::Combined);
        assert!(line.starts_with("192.168.1.1 - - ["));
        assert!(line.contains("] \"GET /octocat/Hello-World/issues/1?label=Votes HTTP/1.1\" 200 1234 "));
        assert!(line.ends_with("\"https://github.com/octocat/Hello-World\" \"github-camo\""));
    }

    #[test]
    fn test_common_line_has_no_headers() {
        let mut record = badge_fetch();
        record.referer = None;
        let line = record.render(AccessLogFormat::Common);
        assert!(line.ends_with("HTTP/1.1\" 200 1234"));
        assert!(!line.contains("github-camo"));

        let combined = record.render(AccessLogFormat::Combined);
        assert!(combined.ends_with("200 1234 \"-\" \"github-camo\""));
    }

    #[test]
    fn test_json_line() {
        let mut record = badge_fetch();
        record.user_agent = Some("quote\" and \\ slash".to_string());
        record.referer = None;

        let value: serde_json::Value =
            serde_json::from_str(&record.render(AccessLogFormat::Json)).unwrap();
        assert_eq!(value["client"], "192.168.1.1");
        assert_eq!(value["target"], "/octocat/Hello-World/issues/1?label=Votes");
        assert_eq!(value["status"], 200);
        assert_eq!(value["elapsed_us"], 1500);
        assert_eq!(value["user_agent"], "quote\" and \\ slash");
        assert!(value["referer"].is_null());
    }
}
