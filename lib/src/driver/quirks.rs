//! Driver-specific behaviour keyed on markers in the connection string.
//!
//! Only quirks observed in practice are listed; anything else uses the caller's defaults.

use crate::options::FetchSize;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverQuirk {
    /// Substring of the connection string that identifies the driver family.
    pub marker: &'static str,
    /// Fetch size to use when neither the caller nor the mapping chose one.
    pub fetch_size: FetchSize,
}

/// MySQL's driver only streams a result set when asked for `Integer.MIN_VALUE` rows;
/// any other fetch size buffers the whole result in memory.
pub const DRIVER_QUIRKS: &[DriverQuirk] = &[DriverQuirk {
    marker: ":mysql:",
    fetch_size: FetchSize::Streaming,
}];

pub fn quirk_for(url: &str) -> Option<&'static DriverQuirk> {
    DRIVER_QUIRKS.iter().find(|q| url.contains(q.marker))
}

/// Chooses the fetch size for one database: the caller's value, then the mapping's own
/// setting, then the driver quirk, then the default.
pub fn choose_fetch_size(
    caller: Option<u32>,
    declared: Option<FetchSize>,
    url: Option<&str>,
    default: u32,
) -> FetchSize {
    if let Some(rows) = caller {
        return FetchSize::Rows(rows.max(1));
    }
    if let Some(declared) = declared {
        return declared;
    }
    if let Some(quirk) = url.and_then(quirk_for) {
        debug!("Applying driver quirk for '{}': fetch size {}", quirk.marker, quirk.fetch_size);
        return quirk.fetch_size;
    }
    FetchSize::Rows(default.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_fetch_size_wins() {
        let size = choose_fetch_size(Some(50), Some(FetchSize::Rows(10)), Some("jdbc:mysql://h/db"), 500);
        assert_eq!(size, FetchSize::Rows(50));
    }

    #[test]
    fn test_mysql_streams_when_unset() {
        let size = choose_fetch_size(None, None, Some("jdbc:mysql://localhost:3306/shop"), 500);
        assert_eq!(size, FetchSize::Streaming);
        assert_eq!(size.as_driver_value(), i32::MIN);
    }

    #[test]
    fn test_mapping_setting_before_quirk() {
        let size = choose_fetch_size(None, Some(FetchSize::Rows(20)), Some("jdbc:mysql://h/db"), 500);
        assert_eq!(size, FetchSize::Rows(20));
    }

    #[test]
    fn test_default_for_other_drivers() {
        assert_eq!(choose_fetch_size(None, None, Some("jdbc:sqlite:x.db"), 500), FetchSize::Rows(500));
        assert_eq!(choose_fetch_size(None, None, None, 500), FetchSize::Rows(500));
        assert!(quirk_for("jdbc:postgresql://h/db").is_none());
    }
}
