//! Declared column scheme of the attendance sheet.
//!
//! Every session label is a header. Its arrival-time column is named
//! `time_column_prefix + label` (`time:Session 3`), so locating or creating it
//! never depends on column positions.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use util::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub student_id_header: String,
    pub name_header: String,
    pub group_header: String,
    pub session_prefix: String,
    pub time_column_prefix: String,
    pub presence_mark: String,
    pub timestamp_offset: FixedOffset,
    pub timestamp_format: String,
}

const DEFAULT_OFFSET_HOURS: i32 = 7;

fn default_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

/// Fixed offset `hours` east of UTC. Out-of-range values fall back to UTC+7.
pub fn offset_from_hours(hours: i64) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            tracing::warn!(hours, "timestamp offset out of range; using UTC+{DEFAULT_OFFSET_HOURS}");
            default_offset()
        })
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            student_id_header: "Student ID".into(),
            name_header: "Name".into(),
            group_header: "Group".into(),
            session_prefix: "Session ".into(),
            time_column_prefix: "time:".into(),
            presence_mark: "✅".into(),
            timestamp_offset: default_offset(),
            timestamp_format: "%d/%m/%Y %H:%M:%S".into(),
        }
    }
}

impl SheetLayout {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            student_id_header: cfg.student_id_header.clone(),
            name_header: cfg.name_header.clone(),
            group_header: cfg.group_header.clone(),
            session_prefix: cfg.session_prefix.clone(),
            time_column_prefix: cfg.time_column_prefix.clone(),
            presence_mark: cfg.presence_mark.clone(),
            timestamp_offset: offset_from_hours(cfg.timestamp_offset_hours),
            ..Self::default()
        }
    }

    /// 1-based index of the header equal to `name` (surrounding whitespace ignored).
    pub fn column_of(header: &[String], name: &str) -> Option<usize> {
        let name = name.trim();
        header.iter().position(|h| h.trim() == name).map(|i| i + 1)
    }

    pub fn time_column_name(&self, session_label: &str) -> String {
        format!("{}{}", self.time_column_prefix, session_label.trim())
    }

    pub fn time_column(&self, header: &[String], session_label: &str) -> Option<usize> {
        Self::column_of(header, &self.time_column_name(session_label))
    }

    /// Whether `label` names a session column: non-blank and starting with the
    /// session prefix, case-insensitively.
    pub fn is_session_label(&self, label: &str) -> bool {
        let label = label.trim();
        !label.is_empty()
            && label
                .to_lowercase()
                .starts_with(&self.session_prefix.to_lowercase())
    }

    /// Session columns of `header`, in column order.
    pub fn session_labels(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|h| h.trim())
            .filter(|h| self.is_session_label(h))
            .map(str::to_string)
            .collect()
    }

    /// Presence predicate: any non-blank cell counts as present.
    pub fn is_present(&self, cell: &str) -> bool {
        !cell.trim().is_empty()
    }

    /// Wall-clock text written into the time column, at the configured fixed offset.
    pub fn format_timestamp(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.timestamp_offset)
            .format(&self.timestamp_format)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn columns_are_one_based_and_trimmed() {
        let h = header(&["Student ID", " Name ", "Session 1"]);
        assert_eq!(SheetLayout::column_of(&h, "Student ID"), Some(1));
        assert_eq!(SheetLayout::column_of(&h, "Name"), Some(2));
        assert_eq!(SheetLayout::column_of(&h, "Session 2"), None);
    }

    #[test]
    fn time_column_follows_naming_scheme() {
        let layout = SheetLayout::default();
        let h = header(&["Student ID", "Session 1", "time:Session 1", "Session 2"]);
        assert_eq!(layout.time_column(&h, "Session 1"), Some(3));
        assert_eq!(layout.time_column(&h, "Session 2"), None);
    }

    #[test]
    fn session_labels_match_prefix_case_insensitively() {
        let layout = SheetLayout::default();
        let h = header(&["Student ID", "Name", "session 1", "time:session 1", "Session 2", ""]);
        assert_eq!(layout.session_labels(&h), vec!["session 1", "Session 2"]);
    }

    #[test]
    fn any_non_blank_value_is_present() {
        let layout = SheetLayout::default();
        assert!(layout.is_present("✅"));
        assert!(layout.is_present("x"));
        assert!(!layout.is_present(""));
        assert!(!layout.is_present("  "));
    }

    #[test]
    fn timestamps_use_fixed_utc_plus_seven() {
        let layout = SheetLayout::default();
        let now = Utc.with_ymd_and_hms(2025, 9, 8, 20, 5, 9).unwrap();
        assert_eq!(layout.format_timestamp(now), "09/09/2025 03:05:09");
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc_plus_seven() {
        assert_eq!(offset_from_hours(-3).local_minus_utc(), -3 * 3600);
        assert_eq!(offset_from_hours(1_000).local_minus_utc(), 7 * 3600);
        assert_eq!(offset_from_hours(i64::MAX).local_minus_utc(), 7 * 3600);

        let mut cfg = AppConfig::from_env();
        cfg.timestamp_offset_hours = 1_000;
        let layout = SheetLayout::from_config(&cfg);
        let now = Utc.with_ymd_and_hms(2025, 9, 8, 20, 5, 9).unwrap();
        assert_eq!(layout.format_timestamp(now), "09/09/2025 03:05:09");
    }

    #[test]
    fn only_prefixed_labels_are_sessions() {
        let layout = SheetLayout::default();
        assert!(layout.is_session_label(" Session 3 "));
        assert!(layout.is_session_label("session 3"));
        assert!(!layout.is_session_label("Group"));
        assert!(!layout.is_session_label("time:Session 1"));
        assert!(!layout.is_session_label("   "));
    }
}
