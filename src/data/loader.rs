use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{is_numeric_column, CellValue, Measurement, MeasurementTable, CITY, DATE};

/// File name of the bundled dataset looked up when nothing was uploaded.
pub const DEFAULT_DATASET: &str = "aqi_data_180_days.csv";

// ---------------------------------------------------------------------------
// Source resolution
// ---------------------------------------------------------------------------

/// Resolve the dataset for a session: upload first, then the default file.
///
/// An empty upload counts as no upload.  `Ok(None)` means neither source is
/// available, which is the "no data" state rather than an error.
pub fn resolve_table(upload: Option<&[u8]>, default_path: &Path) -> Result<Option<MeasurementTable>> {
    if let Some(bytes) = upload.filter(|b| !b.is_empty()) {
        log::info!("Loading uploaded dataset ({} bytes)", bytes.len());
        return load_csv_bytes(bytes).map(Some);
    }

    if default_path.is_file() {
        log::info!("Loading default dataset {}", default_path.display());
        return load_file(default_path).map(Some);
    }

    log::warn!(
        "No upload and no default dataset at {}",
        default_path.display()
    );
    Ok(None)
}

/// Load a dataset from a file.  Dispatch by extension, CSV by default.
///
/// Supported formats:
/// * `.csv`     – header row, one measurement per line
/// * `.json`    – `[{ "date": "...", "city": "...", "AQI": 120, ... }, ...]`
/// * `.parquet` – any column types; every column is read as text first
pub fn load_file(path: &Path) -> Result<MeasurementTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        _ => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_csv_reader(file)
        }
    }
}

// ---------------------------------------------------------------------------
// Row normalisation shared by every format
// ---------------------------------------------------------------------------

/// Accumulates rows from text cells, converting `date`, `city` and the
/// numeric vocabulary.  Bad cells become nulls and are only counted.
struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Measurement>,
    bad_dates: usize,
    bad_numbers: usize,
}

impl TableBuilder {
    fn new(headers: Vec<String>) -> Self {
        TableBuilder {
            headers,
            rows: Vec::new(),
            bad_dates: 0,
            bad_numbers: 0,
        }
    }

    /// Push one row.  Missing trailing cells are nulls; surplus cells are
    /// dropped.
    fn push<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut cells = cells.into_iter();
        let mut city = None;
        let mut date = None;
        let mut values = BTreeMap::new();

        for header in &self.headers {
            let cell = cells
                .next()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty());

            match header.as_str() {
                CITY => city = cell.map(str::to_string),
                DATE => {
                    date = cell.and_then(parse_date);
                    if cell.is_some() && date.is_none() {
                        self.bad_dates += 1;
                    }
                }
                name if is_numeric_column(name) => {
                    let value = match cell {
                        None => CellValue::Null,
                        Some(s) => match s.parse::<f64>() {
                            Ok(v) if v.is_finite() => CellValue::Number(v),
                            _ => {
                                self.bad_numbers += 1;
                                CellValue::Null
                            }
                        },
                    };
                    values.insert(name.to_string(), value);
                }
                name => {
                    values.insert(name.to_string(), cell.map_or(CellValue::Null, guess_cell));
                }
            }
        }

        self.rows.push(Measurement { city, date, values });
    }

    fn finish(self) -> MeasurementTable {
        if self.bad_dates > 0 {
            log::warn!("{} unparseable date(s) set to null", self.bad_dates);
        }
        if self.bad_numbers > 0 {
            log::warn!("{} non-numeric or non-finite reading(s) set to null", self.bad_numbers);
        }
        log::debug!("Loaded {} rows, columns {:?}", self.rows.len(), self.headers);
        MeasurementTable::new(self.headers, self.rows)
    }
}

fn guess_cell(s: &str) -> CellValue {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Text(s.to_string()),
    }
}

/// Permissive date parsing; `None` instead of an error.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY-MM-DD HH:MM[:SS]`,
/// `YYYY-MM-DDTHH:MM:SS[.f]` and RFC 3339 with an offset (converted to UTC).
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y/%m/%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse an in-memory CSV upload.
pub fn load_csv_bytes(bytes: &[u8]) -> Result<MeasurementTable> {
    load_csv_reader(bytes)
}

/// CSV layout: header row with column names, one measurement per record.
/// Ragged records are accepted; a record that cannot be decoded is skipped.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<MeasurementTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut builder = TableBuilder::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        match result {
            Ok(record) => builder.push(record.iter().map(Some)),
            Err(e) => log::warn!("Skipping CSV row {row_no}: {e}"),
        }
    }

    Ok(builder.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "date": "2024-01-01", "city": "Delhi", "AQI": 182, "PM2_5": 95.1 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys in first-seen order.
fn load_json(path: &Path) -> Result<MeasurementTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    load_json_str(&text)
}

fn load_json_str(text: &str) -> Result<MeasurementTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut builder = TableBuilder::new(headers.clone());
    for rec in records {
        let cells: Vec<Option<String>> = headers
            .iter()
            .map(|h| rec.get(h).and_then(json_to_text))
            .collect();
        builder.push(cells.iter().map(Option::as_deref));
    }

    Ok(builder.finish())
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file.  Every column is cast to text with the Arrow cast
/// kernel (dates and timestamps become ISO-8601) and then normalised exactly
/// like a CSV row, so Pandas- and Polars-written files behave the same.
fn load_parquet(path: &Path) -> Result<MeasurementTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    let mut table = TableBuilder::new(headers);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let columns = batch
            .columns()
            .iter()
            .map(|col| cast(col, &DataType::Utf8))
            .collect::<Result<Vec<_>, _>>()
            .context("casting parquet columns to text")?;

        let text_columns = columns
            .iter()
            .map(|col| {
                col.as_any()
                    .downcast_ref::<StringArray>()
                    .context("expected StringArray after cast")
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            table.push(text_columns.iter().map(|col| {
                if col.is_null(row) {
                    None
                } else {
                    Some(col.value(row))
                }
            }));
        }
    }

    Ok(table.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{AQI, POLLUTANTS};
    use anyhow::Result;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const SAMPLE: &str = "\
date,city,AQI,PM2_5,NO2,station
2024-01-01,Delhi,180,95.5,40,North
2024-01-02,Delhi,n/a,88.0,41,North
not-a-date,Mumbai,90,,22,Bandra
2024-01-02,Mumbai,95,30.2,23
";

    #[test]
    fn csv_cells_are_coerced_locally() -> Result<()> {
        let table = load_csv_bytes(SAMPLE.as_bytes())?;

        assert_eq!(table.len(), 4);
        assert_eq!(table.columns, vec!["date", "city", "AQI", "PM2_5", "NO2", "station"]);

        // bad numeric cell → null, rest of the row survives
        assert_eq!(table.rows[1].number(AQI), None);
        assert_eq!(table.rows[1].number("PM2_5"), Some(88.0));

        // bad date → null date only
        assert_eq!(table.rows[2].date, None);
        assert_eq!(table.rows[2].city.as_deref(), Some("Mumbai"));
        assert_eq!(table.rows[2].number("PM2_5"), None);

        // short row: trailing pass-through column is null
        assert!(table.rows[3].values["station"].is_null());
        assert_eq!(table.rows[0].values["station"], CellValue::Text("North".into()));
        Ok(())
    }

    #[test]
    fn non_finite_readings_become_null() -> Result<()> {
        let table = load_csv_bytes(b"AQI,PM2_5,PM10,note\ninf,1e400,-Infinity,inf\nNaN,12.5,30,x\n")?;
        assert!(table.rows[0].values[AQI].is_null());
        assert!(table.rows[0].values["PM2_5"].is_null());
        assert!(table.rows[0].values["PM10"].is_null());
        assert_eq!(table.rows[0].values["note"], CellValue::Text("inf".into()));
        assert!(table.rows[1].values[AQI].is_null());
        assert_eq!(table.rows[1].number("PM2_5"), Some(12.5));
        Ok(())
    }

    #[test]
    fn dates_parse_permissively() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(parse_date("2024-03-05"), midnight);
        assert_eq!(parse_date("2024/03/05"), midnight);
        assert_eq!(parse_date("2024-03-05T00:00:00"), midnight);
        assert_eq!(parse_date("2024-03-05 00:00"), midnight);
        assert_eq!(parse_date("2024-03-05T02:00:00+02:00"), midnight);
        assert_eq!(parse_date("05.03.2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn resolution_prefers_upload_then_default() -> Result<()> {
        let dir = tempdir()?;
        let default_path = dir.path().join(DEFAULT_DATASET);

        // nothing available → absent, not an error
        assert!(resolve_table(None, &default_path)?.is_none());
        assert!(resolve_table(Some(&[][..]), &default_path)?.is_none());

        std::fs::write(&default_path, "date,city,AQI\n2024-01-01,Pune,70\n")?;
        let from_default = resolve_table(None, &default_path)?.expect("default table");
        assert_eq!(from_default.rows[0].city.as_deref(), Some("Pune"));

        let upload = b"date,city,AQI\n2024-01-01,Agra,150\n2024-01-02,Agra,160\n";
        let from_upload = resolve_table(Some(&upload[..]), &default_path)?.expect("uploaded table");
        assert_eq!(from_upload.len(), 2);
        assert_eq!(from_upload.rows[0].city.as_deref(), Some("Agra"));
        Ok(())
    }

    #[test]
    fn missing_columns_are_not_fatal() -> Result<()> {
        let table = load_csv_bytes(b"city,PM10\nDelhi,210\n")?;
        assert!(!table.has_column(AQI));
        assert!(!table.has_column(DATE));
        assert_eq!(table.rows[0].date, None);
        assert_eq!(table.pollutant_columns(), vec![POLLUTANTS[1]]);
        Ok(())
    }

    #[test]
    fn json_records_load() -> Result<()> {
        let mut tmp = NamedTempFile::with_suffix(".json")?;
        write!(
            tmp,
            r#"[{{"date":"2024-01-01","city":"Delhi","AQI":180}},
                {{"date":"2024-01-02","city":"Delhi","AQI":null,"O3":31.5}}]"#
        )?;

        let table = load_file(tmp.path())?;
        assert_eq!(table.columns, vec!["date", "city", "AQI", "O3"]);
        assert_eq!(table.rows[0].number(AQI), Some(180.0));
        assert_eq!(table.rows[1].number(AQI), None);
        assert_eq!(table.rows[0].number("O3"), None);
        assert_eq!(table.rows[1].number("O3"), Some(31.5));
        Ok(())
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(load_json_str(r#"{"city":"Delhi"}"#).is_err());
    }

    #[test]
    fn parquet_round_trips_through_text() -> Result<()> {
        use arrow::array::{Date32Array, Float64Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;
        use std::sync::Arc;

        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, true),
            Field::new("city", DataType::Utf8, true),
            Field::new("AQI", DataType::Float64, true),
        ]));
        // 19723 days after the epoch = 2024-01-01
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![Some(19723), None])),
                Arc::new(StringArray::from(vec![Some("Delhi"), Some("Delhi")])),
                Arc::new(Float64Array::from(vec![Some(150.0), None])),
            ],
        )?;

        let tmp = NamedTempFile::with_suffix(".parquet")?;
        let mut writer = ArrowWriter::try_new(tmp.reopen()?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let table = load_file(tmp.path())?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].date, parse_date("2024-01-01"));
        assert_eq!(table.rows[0].number(AQI), Some(150.0));
        assert_eq!(table.rows[1].date, None);
        assert_eq!(table.rows[1].number(AQI), None);
        Ok(())
    }
}
