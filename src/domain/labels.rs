//! Static display-name tables.
//!
//! Lookups never fail: an unmapped code is returned verbatim.

use phf::phf_map;

static COUNTRY_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "USA" => "United States",
    "BRA" => "Brazil",
    "DEU" => "Germany",
    "ZAF" => "South Africa",
    "IND" => "India",
};

static INDICATOR_COLUMNS: phf::Map<&'static str, &'static str> = phf_map! {
    "NGDP_RPCH" => "GDP_Growth",
    "PCPIPCH" => "Inflation",
};

/// Summary-sheet header per wide-table column.
static SUMMARY_HEADERS: phf::Map<&'static str, &'static str> = phf_map! {
    "GDP_Growth" => "Avg GDP Growth (%)",
    "Inflation" => "Avg Inflation (%)",
};

/// Human-readable quantity per wide-table column (chart titles and axes).
static COLUMN_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "GDP_Growth" => "GDP Growth",
    "Inflation" => "Inflation",
};

pub fn country_name(code: &str) -> &str {
    COUNTRY_NAMES.get(code).copied().unwrap_or(code)
}

pub fn is_known_country(code: &str) -> bool {
    COUNTRY_NAMES.contains_key(code)
}

pub fn indicator_column(code: &str) -> &str {
    INDICATOR_COLUMNS.get(code).copied().unwrap_or(code)
}

pub fn is_known_indicator(code: &str) -> bool {
    INDICATOR_COLUMNS.contains_key(code)
}

pub fn summary_header(column: &str) -> String {
    match SUMMARY_HEADERS.get(column) {
        Some(header) => header.to_string(),
        None => format!("Avg {column}"),
    }
}

pub fn column_label(column: &str) -> &str {
    COLUMN_LABELS.get(column).copied().unwrap_or(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_COUNTRIES, DEFAULT_INDICATORS};

    #[test]
    fn default_codes_are_all_mapped() {
        for code in DEFAULT_COUNTRIES {
            assert!(is_known_country(code), "missing display name for {code}");
        }
        for code in DEFAULT_INDICATORS {
            assert!(is_known_indicator(code), "missing column name for {code}");
            assert!(SUMMARY_HEADERS.contains_key(indicator_column(code)));
        }
    }

    #[test]
    fn unmapped_codes_pass_through() {
        assert_eq!(country_name("USA"), "United States");
        assert_eq!(country_name("XXX"), "XXX");
        assert_eq!(indicator_column("NGDP_RPCH"), "GDP_Growth");
        assert_eq!(indicator_column("LUR"), "LUR");
        assert_eq!(summary_header("LUR"), "Avg LUR");
    }
}
