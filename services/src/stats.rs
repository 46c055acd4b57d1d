//! Per-session attendance statistics, overall and per group.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::AttendanceError;
use crate::sheet_layout::SheetLayout;

/// Group name used for rows with a blank group cell (or no group column).
pub const UNKNOWN_GROUP: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: String,
    pub present: usize,
    pub absent: usize,
    pub total: usize,
    /// Percent present, one decimal. `None` for an empty group.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub session_label: String,
    pub present: usize,
    pub absent: usize,
    pub total: usize,
    pub rate: Option<f64>,
    pub groups: Vec<GroupStats>,
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col - 1).map(String::as_str).unwrap_or("")
}

fn rate(present: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| (present as f64 / total as f64 * 1000.0).round() / 10.0)
}

/// Counts present/absent students for `session_label`.
///
/// Rows without a student id are skipped; they are blank spacer rows in the sheet.
pub fn session_stats(
    layout: &SheetLayout,
    header: &[String],
    records: &[Vec<String>],
    session_label: &str,
) -> Result<SessionStats, AttendanceError> {
    let label = session_label.trim();
    let col = SheetLayout::column_of(header, label)
        .ok_or_else(|| AttendanceError::HeaderNotFound(label.to_string()))?;
    let id_col = SheetLayout::column_of(header, &layout.student_id_header);
    let group_col = SheetLayout::column_of(header, &layout.group_header);

    let mut by_group: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for row in records {
        if let Some(id_col) = id_col {
            if cell(row, id_col).trim().is_empty() {
                continue;
            }
        } else if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let group = group_col
            .map(|g| cell(row, g).trim())
            .filter(|g| !g.is_empty())
            .unwrap_or(UNKNOWN_GROUP)
            .to_string();
        let entry = by_group.entry(group).or_default();
        if layout.is_present(cell(row, col)) {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    let groups: Vec<GroupStats> = by_group
        .into_iter()
        .map(|(group, (present, absent))| GroupStats {
            group,
            present,
            absent,
            total: present + absent,
            rate: rate(present, present + absent),
        })
        .collect();

    let present: usize = groups.iter().map(|g| g.present).sum();
    let absent: usize = groups.iter().map(|g| g.absent).sum();
    Ok(SessionStats {
        session_label: label.to_string(),
        present,
        absent,
        total: present + absent,
        rate: rate(present, present + absent),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn sheet() -> (Vec<String>, Vec<Vec<String>>) {
        let header = strings(&["Student ID", "Name", "Group", "Session 1", "time:Session 1"]);
        let rows = vec![
            strings(&["1", "A", "1", "✅", "08/09/2025 07:01:00"]),
            strings(&["2", "B", "1", ""]),
            strings(&["3", "C", "2", "x"]),
            strings(&["4", "D", " "]),
            strings(&[]),
            strings(&["5", "E", "2", "✅"]),
        ];
        (header, rows)
    }

    #[test]
    fn counts_overall_and_by_group() {
        let (header, rows) = sheet();
        let stats = session_stats(&SheetLayout::default(), &header, &rows, "Session 1").unwrap();

        assert_eq!((stats.present, stats.absent, stats.total), (3, 2, 5));
        assert_eq!(stats.rate, Some(60.0));

        let names: Vec<&str> = stats.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["1", "2", UNKNOWN_GROUP]);
        assert_eq!(stats.groups[0].rate, Some(50.0));
        assert_eq!(stats.groups[1].present, 2);
        assert_eq!(stats.groups[2].absent, 1);
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        assert_eq!(rate(1, 3), Some(33.3));
        assert_eq!(rate(2, 3), Some(66.7));
        assert_eq!(rate(0, 0), None);
    }

    #[test]
    fn unknown_session_is_reported() {
        let (header, rows) = sheet();
        let err = session_stats(&SheetLayout::default(), &header, &rows, "Session 7").unwrap_err();
        assert_eq!(err, AttendanceError::HeaderNotFound("Session 7".into()));
    }

    #[test]
    fn empty_sheet_has_no_rate() {
        let (header, _) = sheet();
        let stats = session_stats(&SheetLayout::default(), &header, &[], "Session 1").unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.rate, None);
        assert!(stats.groups.is_empty());
    }
}
