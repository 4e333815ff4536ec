//! Append-only operator event log with CSV export
//!
//! Every recorded [`TransitionEvent`] is also forwarded to the `log` facade at
//! the matching level, so a headless run still leaves a trace.
//!
//! CSV layout:
//!
//! ```text
//! time,channel,serial,category,detail,relay,severity
//! "2024-05-03 14:02:11","1","SN-0042","supply","V=4.50 outside [4.70, 5.50]","ON","ERROR"
//! ```
//!
//! Channels are 1-based in the export. Times are UTC when the log was fed by a
//! wall clock, raw milliseconds otherwise.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::time::{TimeSource, Timestamp};
use crate::transitions::{Severity, TransitionEvent};

/// CSV header line, without the trailing newline
pub const CSV_HEADER: &str = "time,channel,serial,category,detail,relay,severity";

/// Ordered list of transition events
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: Vec<TransitionEvent>,
    wall_clock: bool,
}

impl Default for EventLog {
    fn default() -> Self {
        Self { entries: Vec::new(), wall_clock: true }
    }
}

impl EventLog {
    /// Empty log whose timestamps are exported as UTC dates
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty log stamped by `clock`; non-wall clocks export raw milliseconds
    pub fn for_clock(clock: &dyn TimeSource) -> Self {
        Self { entries: Vec::new(), wall_clock: clock.is_wall_clock() }
    }

    /// Append one event and forward it to the logger
    pub fn record(&mut self, event: TransitionEvent) {
        match event.severity {
            Severity::Error => log_error!(
                "ch{} [{}] {}: {}",
                event.channel + 1,
                event.serial_label(),
                event.category,
                event.detail
            ),
            Severity::Warn => log_warn!(
                "ch{} [{}] {}: {}",
                event.channel + 1,
                event.serial_label(),
                event.category,
                event.detail
            ),
            Severity::Ok | Severity::Info => log_info!(
                "ch{} [{}] {}: {}",
                event.channel + 1,
                event.serial_label(),
                event.category,
                event.detail
            ),
        }
        self.entries.push(event);
    }

    /// Append a batch, usually the output of one `observe()` call
    pub fn extend<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = TransitionEvent>,
    {
        for event in events {
            self.record(event);
        }
    }

    /// Recorded events, oldest first
    pub fn entries(&self) -> &[TransitionEvent] {
        &self.entries
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at or above `severity`
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &TransitionEvent> {
        self.entries.iter().filter(move |e| e.severity >= severity)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write header and all entries as CSV
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{CSV_HEADER}")?;
        for event in &self.entries {
            let channel = (event.channel + 1).to_string();
            let time = if self.wall_clock {
                format_time(event.timestamp)
            } else {
                event.timestamp.to_string()
            };
            let fields = [
                time,
                channel,
                event.serial_label().to_owned(),
                event.category.name().to_owned(),
                event.detail.clone(),
                event.relay_label().to_owned(),
                event.severity.name().to_owned(),
            ];
            let line = fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",");
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC; out-of-range values fall back to raw milliseconds
pub fn format_time(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SteppedTime;
    use crate::transitions::Category;

    fn event(channel: u8, severity: Severity, detail: &str) -> TransitionEvent {
        TransitionEvent {
            timestamp: 1_714_744_931_000,
            channel,
            serial: None,
            category: Category::Supply,
            severity,
            detail: detail.to_owned(),
            relay_on: true,
        }
    }

    #[test]
    fn formats_utc_seconds() {
        assert_eq!(format_time(1_714_744_931_000), "2024-05-03 14:02:11");
        assert_eq!(format_time(0), "1970-01-01 00:00:00");
    }

    #[test]
    fn csv_quotes_and_numbers_from_one() {
        let mut log = EventLog::new();
        log.record(event(0, Severity::Error, "V=4.50 outside [4.70, 5.50]"));
        let mut with_serial = event(7, Severity::Ok, "said \"hi\"");
        with_serial.serial = Some("SN,1".to_owned());
        with_serial.relay_on = false;
        log.record(with_serial);

        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            r#""2024-05-03 14:02:11","1","-","supply","V=4.50 outside [4.70, 5.50]","ON","ERROR""#
        );
        assert_eq!(
            lines[2],
            r#""2024-05-03 14:02:11","8","SN,1","supply","said ""hi""","OFF","OK""#
        );
    }

    #[test]
    fn stepped_clock_exports_raw_milliseconds() {
        let clock = SteppedTime::new(0, 200);
        let mut log = EventLog::for_clock(&clock);
        clock.now();
        let mut stale = event(2, Severity::Warn, "read failed, values stale");
        stale.timestamp = clock.now();
        log.record(stale);

        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some(r#""200","3","-","supply","read failed, values stale","ON","WARN""#)
        );
    }

    #[test]
    fn wall_clock_exports_dates() {
        let mut log = EventLog::for_clock(&crate::time::SystemTime);
        log.record(event(0, Severity::Info, "first sample"));

        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"2024-05-03 14:02:11\""));
    }

    #[test]
    fn filter_and_clear() {
        let mut log = EventLog::new();
        log.extend([
            event(0, Severity::Ok, "recovered"),
            event(1, Severity::Warn, "read failed, values stale"),
            event(2, Severity::Error, "V=0.00 outside [4.70, 5.50]"),
        ]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.at_least(Severity::Warn).count(), 2);

        log.clear();
        assert!(log.is_empty());
    }
}
