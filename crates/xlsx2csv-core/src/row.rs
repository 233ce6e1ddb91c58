//! Row normalization

/// How a row compared to the header width before normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// Already the header's width
    Exact,
    /// Shorter than the header; padded on the right with empty fields
    Padded { original: usize },
    /// Longer than the header; extra fields were dropped
    Truncated { original: usize },
}

/// Fit a row to exactly `column_count` fields.
///
/// Short rows are padded with empty strings, long rows keep their first
/// `column_count` fields.
pub fn normalize_row(mut row: Vec<String>, column_count: usize) -> (Vec<String>, RowShape) {
    let original = row.len();
    let shape = if original < column_count {
        row.resize(column_count, String::new());
        RowShape::Padded { original }
    } else if original > column_count {
        row.truncate(column_count);
        RowShape::Truncated { original }
    } else {
        RowShape::Exact
    };
    (row, shape)
}
