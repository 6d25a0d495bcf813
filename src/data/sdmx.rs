//! SDMX integration for the IMF World Economic Outlook dataflow.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::domain::{Query, RawTable};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.imf.org/external/sdmx/2.1";
const BASE_URL_ENV: &str = "WEO_SDMX_BASE_URL";
const ACCEPT_STRUCTURE_SPECIFIC: &str = "application/vnd.sdmx.structurespecificdata+xml;version=2.1";

/// Observation attribute carrying the numeric value.
const OBS_VALUE: &str = "OBS_VALUE";

/// Column name given to `OBS_VALUE` in the raw table.
pub const VALUE_COLUMN: &str = "value";

pub const COUNTRY_DIMENSION: &str = "COUNTRY";
pub const INDICATOR_DIMENSION: &str = "INDICATOR";

/// Anything that can answer a data query with raw observations.
pub trait ObservationSource {
    fn fetch(&self, query: &Query) -> Result<RawTable, AppError>;
}

pub struct SdmxClient {
    client: Client,
    base_url: String,
}

impl SdmxClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Explicit URL first, then `WEO_SDMX_BASE_URL` (`.env` honoured), then the IMF default.
    pub fn from_env(base_url: Option<String>) -> Self {
        dotenvy::dotenv().ok();
        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn data_url(&self, query: &Query) -> String {
        format!("{}/data/{}/{}", self.base_url, query.dataflow, query.key())
    }
}

impl ObservationSource for SdmxClient {
    fn fetch(&self, query: &Query) -> Result<RawTable, AppError> {
        let url = self.data_url(query);
        info!(%url, start = query.start_year, end = query.end_year, "requesting observations");

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT_STRUCTURE_SPECIFIC)
            .query(&[
                ("startPeriod", query.start_year.to_string()),
                ("endPeriod", query.end_year.to_string()),
            ])
            .send()
            .map_err(|e| AppError::Retrieval(format!("SDMX request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Retrieval(format!(
                "SDMX request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::Retrieval(format!("Failed to read SDMX response: {e}")))?;

        let table = parse_structure_specific(&body)?;
        check_coverage(&table, query)?;
        info!(rows = table.len(), columns = table.columns.len(), "observations received");
        Ok(table)
    }
}

/// Flatten an SDMX-ML structure-specific data message into a raw table.
///
/// Each `Obs` becomes one row holding the attributes of its enclosing
/// `Series` followed by its own attributes. Columns appear in first-seen order.
pub fn parse_structure_specific(xml: &str) -> Result<RawTable, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<(usize, String)> = Vec::new();
    let mut sparse_rows: Vec<Vec<(usize, String)>> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| AppError::Retrieval(format!("Malformed SDMX message: {e}")))?;
        match event {
            Event::Start(ref e) if e.local_name().as_ref() == b"Series" => {
                series = read_attributes(e, &mut columns, &mut index)?;
            }
            Event::End(ref e) if e.local_name().as_ref() == b"Series" => {
                series.clear();
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Obs" => {
                let mut row = series.clone();
                row.extend(read_attributes(e, &mut columns, &mut index)?);
                sparse_rows.push(row);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let rows = sparse_rows
        .into_iter()
        .map(|cells| {
            let mut row = vec![None; columns.len()];
            for (idx, value) in cells {
                row[idx] = Some(value);
            }
            row
        })
        .collect();

    debug!(?columns, "parsed SDMX message");
    Ok(RawTable { columns, rows })
}

fn read_attributes(
    element: &BytesStart<'_>,
    columns: &mut Vec<String>,
    index: &mut HashMap<String, usize>,
) -> Result<Vec<(usize, String)>, AppError> {
    let mut out = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| AppError::Retrieval(format!("Malformed SDMX attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|e| AppError::Retrieval(format!("Non UTF-8 SDMX attribute name: {e}")))?
            .to_string();
        // Namespace declarations and xsi:type are not data.
        if attr.key.as_ref().starts_with(b"xmlns") || attr.key.as_ref().starts_with(b"xsi:") {
            continue;
        }
        let name = if key == OBS_VALUE { VALUE_COLUMN.to_string() } else { key };
        let value = attr
            .unescape_value()
            .map_err(|e| AppError::Retrieval(format!("Malformed SDMX attribute value: {e}")))?
            .to_string();

        let idx = match index.get(&name) {
            Some(&idx) => idx,
            None => {
                columns.push(name.clone());
                index.insert(name, columns.len() - 1);
                columns.len() - 1
            }
        };
        out.push((idx, value));
    }
    Ok(out)
}

/// Every requested country and indicator must come back with at least one row.
pub fn check_coverage(table: &RawTable, query: &Query) -> Result<(), AppError> {
    if table.is_empty() {
        return Err(AppError::Retrieval(format!(
            "No observations returned for {}.",
            query.key()
        )));
    }

    for (dimension, requested) in [
        (COUNTRY_DIMENSION, &query.countries),
        (INDICATOR_DIMENSION, &query.indicators),
    ] {
        let present = table.distinct(dimension);
        let missing: Vec<&str> = requested
            .iter()
            .map(String::as_str)
            .filter(|code| !present.contains(code))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Retrieval(format!(
                "No observations returned for {dimension} {}.",
                missing.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<message:StructureSpecificData xmlns:message="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/message" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:ss="http://www.sdmx.org/resources/sdmxml/schemas/v2_1/data/structurespecific">
  <message:Header><message:ID>IDREF1</message:ID></message:Header>
  <message:DataSet ss:dataScope="DataStructure" xsi:type="ns1:DataSetType">
    <Series COUNTRY="USA" INDICATOR="NGDP_RPCH" FREQUENCY="A" LATEST_ACTUAL_ANNUAL_DATA="2023" OVERLAP="OL" METHODOLOGY_NOTES="Chain-weighted" METHODOLOGY="National accounts">
      <Obs TIME_PERIOD="2023" OBS_VALUE="2.9" />
      <Obs TIME_PERIOD="2024" OBS_VALUE="2.8" />
    </Series>
    <Series COUNTRY="USA" INDICATOR="PCPIPCH" FREQUENCY="A" LATEST_ACTUAL_ANNUAL_DATA="2023" OVERLAP="OL" METHODOLOGY_NOTES="CPI &amp; urban" METHODOLOGY="CPI">
      <Obs TIME_PERIOD="2023" OBS_VALUE="4.1" />
      <Obs TIME_PERIOD="2024" OBS_VALUE="NaN" />
    </Series>
  </message:DataSet>
</message:StructureSpecificData>"#;

    fn query(countries: &[&str], indicators: &[&str]) -> Query {
        Query {
            countries: countries.iter().map(|c| c.to_string()).collect(),
            indicators: indicators.iter().map(|c| c.to_string()).collect(),
            ..Query::default()
        }
    }

    #[test]
    fn parses_series_and_observation_attributes() {
        let table = parse_structure_specific(FIXTURE).unwrap();
        assert_eq!(
            table.columns,
            vec![
                "COUNTRY",
                "INDICATOR",
                "FREQUENCY",
                "LATEST_ACTUAL_ANNUAL_DATA",
                "OVERLAP",
                "METHODOLOGY_NOTES",
                "METHODOLOGY",
                "TIME_PERIOD",
                "value",
            ]
        );
        assert_eq!(table.len(), 4);

        let value = table.column_index("value").unwrap();
        let notes = table.column_index("METHODOLOGY_NOTES").unwrap();
        assert_eq!(table.rows[0][value].as_deref(), Some("2.9"));
        assert_eq!(table.rows[3][value].as_deref(), Some("NaN"));
        assert_eq!(table.rows[2][notes].as_deref(), Some("CPI & urban"));
        assert!(!table.columns.iter().any(|c| c == "dataScope" || c == "type"));
    }

    #[test]
    fn coverage_requires_every_requested_code() {
        let table = parse_structure_specific(FIXTURE).unwrap();
        assert!(check_coverage(&table, &query(&["USA"], &["NGDP_RPCH", "PCPIPCH"])).is_ok());

        let err = check_coverage(&table, &query(&["USA", "BRA"], &["NGDP_RPCH"])).unwrap_err();
        assert!(matches!(err, AppError::Retrieval(ref m) if m.contains("BRA")));
    }

    #[test]
    fn empty_message_is_a_retrieval_error() {
        let table = parse_structure_specific("<message:StructureSpecificData/>").unwrap();
        let err = check_coverage(&table, &Query::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn data_url_uses_dataflow_and_key() {
        let client = SdmxClient::new("https://example.org/sdmx/");
        assert_eq!(
            client.data_url(&query(&["USA", "DEU"], &["PCPIPCH"])),
            "https://example.org/sdmx/data/WEO/USA+DEU.PCPIPCH"
        );
    }
}
