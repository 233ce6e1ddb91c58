//! Conversion settings

use crate::error::{Error, Result};

/// Records written between progress reports (and output flushes)
pub const PROGRESS_REPORT_INTERVAL: usize = 1000;

/// Options for a single sheet conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// 0-based index of the sheet to convert; negative values are out of bounds
    pub sheet_index: i64,
    /// Report progress and flush every this many records (0 disables)
    pub progress_interval: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            sheet_index: 0,
            progress_interval: PROGRESS_REPORT_INTERVAL,
        }
    }
}

impl ConvertOptions {
    /// Whether a progress report is due after `records` records
    pub fn progress_due(&self, records: usize) -> bool {
        self.progress_interval > 0 && records > 0 && records % self.progress_interval == 0
    }
}

/// Check a requested sheet index against the number of sheets
pub fn sheet_position(index: i64, count: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&position| position < count)
        .ok_or(Error::SheetOutOfBounds { index, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert_eq!(options.sheet_index, 0);
        assert_eq!(options.progress_interval, 1000);
    }

    #[test]
    fn test_progress_due() {
        let options = ConvertOptions::default();
        assert!(!options.progress_due(0));
        assert!(!options.progress_due(999));
        assert!(options.progress_due(1000));
        assert!(options.progress_due(3000));

        let disabled = ConvertOptions {
            progress_interval: 0,
            ..Default::default()
        };
        assert!(!disabled.progress_due(1000));
    }

    #[test]
    fn test_sheet_position() {
        assert_eq!(sheet_position(0, 2).unwrap(), 0);
        assert_eq!(sheet_position(1, 2).unwrap(), 1);
        assert!(matches!(
            sheet_position(2, 2),
            Err(Error::SheetOutOfBounds { index: 2, count: 2 })
        ));
        assert!(matches!(
            sheet_position(-1, 2),
            Err(Error::SheetOutOfBounds { index: -1, count: 2 })
        ));
        assert!(sheet_position(0, 0).is_err());
    }
}
