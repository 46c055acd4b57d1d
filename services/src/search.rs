//! Lecturer-side student lookup by id or name fragment.

use serde::Serialize;

use crate::error::AttendanceError;
use crate::identity::normalize_name;
use crate::sheet_layout::SheetLayout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub row: usize,
    pub student_id: String,
    pub name: String,
    pub group: Option<String>,
    /// Session columns marked present for this student.
    pub attended: usize,
    pub sessions: usize,
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col - 1).map(|s| s.trim()).unwrap_or("")
}

/// Case-insensitive substring search over ids and normalized names.
///
/// A blank query lists every student.
pub fn search_students(
    layout: &SheetLayout,
    header: &[String],
    records: &[Vec<String>],
    query: &str,
) -> Result<Vec<StudentSummary>, AttendanceError> {
    let id_col = SheetLayout::column_of(header, &layout.student_id_header)
        .ok_or_else(|| AttendanceError::HeaderNotFound(layout.student_id_header.clone()))?;
    let name_col = SheetLayout::column_of(header, &layout.name_header)
        .ok_or_else(|| AttendanceError::HeaderNotFound(layout.name_header.clone()))?;
    let group_col = SheetLayout::column_of(header, &layout.group_header);
    let session_cols: Vec<usize> = layout
        .session_labels(header)
        .iter()
        .filter_map(|label| SheetLayout::column_of(header, label))
        .collect();

    let needle = normalize_name(query).to_lowercase();

    let mut out = Vec::new();
    for (i, row) in records.iter().enumerate() {
        let student_id = cell(row, id_col);
        if student_id.is_empty() {
            continue;
        }
        let name = normalize_name(cell(row, name_col));
        let hit = needle.is_empty()
            || student_id.to_lowercase().contains(&needle)
            || name.to_lowercase().contains(&needle);
        if !hit {
            continue;
        }
        out.push(StudentSummary {
            // records start at sheet row 2
            row: i + 2,
            student_id: student_id.to_string(),
            name,
            group: group_col
                .map(|g| cell(row, g).to_string())
                .filter(|g| !g.is_empty()),
            attended: session_cols
                .iter()
                .filter(|&&c| layout.is_present(cell(row, c)))
                .count(),
            sessions: session_cols.len(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn sheet() -> (Vec<String>, Vec<Vec<String>>) {
        let header = strings(&[
            "Student ID",
            "Name",
            "Group",
            "Session 1",
            "time:Session 1",
            "Session 2",
        ]);
        let rows = vec![
            strings(&["12345678", "tran van b", "1", "✅", "t", "✅"]),
            strings(&["87654321", "Nguyen Van A", "", "", "", "x"]),
            strings(&["", "Spacer"]),
            strings(&["11112222", "Le Thi C", "2"]),
        ];
        (header, rows)
    }

    #[test]
    fn matches_id_fragments_and_names_case_insensitively() {
        let (header, rows) = sheet();
        let layout = SheetLayout::default();

        let by_id = search_students(&layout, &header, &rows, "4321").unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name, "Nguyen Van A");
        assert_eq!(by_id[0].row, 3);
        assert_eq!(by_id[0].group, None);

        let by_name = search_students(&layout, &header, &rows, "  VAN ").unwrap();
        let ids: Vec<&str> = by_name.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["12345678", "87654321"]);
    }

    #[test]
    fn counts_attended_sessions_only() {
        let (header, rows) = sheet();
        let all = search_students(&SheetLayout::default(), &header, &rows, "").unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!((all[0].attended, all[0].sessions), (2, 2));
        assert_eq!(all[1].attended, 1);
        assert_eq!(all[2].attended, 0);
    }

    #[test]
    fn missing_id_column_is_reported() {
        let header = strings(&["Name"]);
        let err = search_students(&SheetLayout::default(), &header, &[], "x").unwrap_err();
        assert_eq!(err, AttendanceError::HeaderNotFound("Student ID".into()));
    }
}
