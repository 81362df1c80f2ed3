//! CSV ingest: raw delimited text to `PriceRecord`s.
//!
//! This module is responsible for turning a `date, key, price` table into a
//! flat, order-preserving list of records that are safe to group.
//!
//! Design goals:
//! - **Strict schema** for the three required columns (a structural error)
//! - **Row-level tolerance** (skip bad rows, but report what happened)
//! - **Single pass**, no grouping or sorting here

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

use crate::domain::PriceRecord;
use crate::error::DataSourceError;

const DATE_COLUMNS: [&str; 1] = ["date"];
const KEY_COLUMNS: [&str; 4] = ["ticker", "symbol", "instrument", "key"];
const PRICE_COLUMNS: [&str; 4] = ["close_price_raw", "close_price", "close", "price"];

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    MissingKey,
    MissingDate,
    MissingPrice,
    InvalidDate(String),
    InvalidPrice(String),
    Undecodable(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingKey => f.write_str("missing instrument key"),
            DropReason::MissingDate => f.write_str("missing date"),
            DropReason::MissingPrice => f.write_str("missing price"),
            DropReason::InvalidDate(raw) => write!(f, "invalid date '{raw}'"),
            DropReason::InvalidPrice(raw) => write!(f, "invalid price '{raw}'"),
            DropReason::Undecodable(msg) => write!(f, "undecodable row: {msg}"),
        }
    }
}

/// A row that was skipped during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRow {
    /// 1-based line number in the input (the header is line 1).
    pub line: u64,
    pub reason: DropReason,
}

/// Ingest output: usable records in input order plus the rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub records: Vec<PriceRecord>,
    pub dropped: Vec<MalformedRow>,
    pub rows_read: usize,
}

/// Column positions of the three required fields.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    key: usize,
    price: usize,
}

/// Parse a headed CSV stream into price records.
///
/// Bad rows are collected in `ParsedRows::dropped`; only a missing header,
/// a missing required column, or an I/O failure is an error.
pub fn parse_records<R: Read>(input: R) -> Result<ParsedRows, DataSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(DataSourceError::Read)?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DataSourceError::MissingHeader);
    }
    let columns = resolve_columns(&headers)?;

    let mut parsed = ParsedRows::default();
    let mut record = StringRecord::new();

    loop {
        let line = reader.position().line();
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                parsed.rows_read += 1;
                let line = record.position().map_or(line, |p| p.line());
                match parse_row(&record, columns) {
                    Ok(r) => parsed.records.push(r),
                    Err(reason) => {
                        debug!(line, %reason, "dropping row");
                        parsed.dropped.push(MalformedRow { line, reason });
                    }
                }
            }
            Err(e) if e.is_io_error() => return Err(DataSourceError::Read(e)),
            Err(e) => {
                parsed.rows_read += 1;
                let line = e.position().map_or(line, |p| p.line());
                let reason = DropReason::Undecodable(e.to_string());
                debug!(line, %reason, "dropping row");
                parsed.dropped.push(MalformedRow { line, reason });
            }
        }
    }

    Ok(parsed)
}

/// Convenience wrapper for in-memory text.
pub fn parse_text(text: &str) -> Result<ParsedRows, DataSourceError> {
    parse_records(text.as_bytes())
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, DataSourceError> {
    let header_map = build_header_map(headers);
    Ok(Columns {
        date: find_column(&header_map, "date", &DATE_COLUMNS)?,
        key: find_column(&header_map, "instrument key", &KEY_COLUMNS)?,
        price: find_column(&header_map, "price", &PRICE_COLUMNS)?,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(
    header_map: &HashMap<String, usize>,
    field: &'static str,
    aliases: &[&str],
) -> Result<usize, DataSourceError> {
    aliases
        .iter()
        .find_map(|alias| header_map.get(*alias).copied())
        .ok_or_else(|| DataSourceError::MissingColumn {
            field,
            expected: aliases.join(", "),
        })
}

fn parse_row(record: &StringRecord, columns: Columns) -> Result<PriceRecord, DropReason> {
    let key = get_value(record, columns.key).ok_or(DropReason::MissingKey)?;
    let raw_date = get_value(record, columns.date).ok_or(DropReason::MissingDate)?;
    let date = parse_date(raw_date).ok_or_else(|| DropReason::InvalidDate(raw_date.to_string()))?;

    let raw_price = get_value(record, columns.price).ok_or(DropReason::MissingPrice)?;
    let price = parse_price(raw_price).ok_or_else(|| DropReason::InvalidPrice(raw_price.to_string()))?;

    Ok(PriceRecord {
        key: key.to_string(),
        date,
        price,
    })
}

fn get_value(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a calendar date.
///
/// `YYYY-MM-DD` is canonical; a few common export formats are accepted too.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    let s = s.trim();
    FMTS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_price(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_canonical_header_in_order() {
        let text = "Date,TICKER,Close_Price_Raw\n\
                    2023-01-01,AAA,10.0\n\
                    2023-02-01,AAA,12.0\n\
                    2023-01-15,BBB,5.0\n";
        let parsed = parse_text(text).unwrap();
        assert_eq!(parsed.rows_read, 3);
        assert!(parsed.dropped.is_empty());
        assert_eq!(
            parsed.records,
            vec![
                PriceRecord { key: "AAA".into(), date: d(2023, 1, 1), price: 10.0 },
                PriceRecord { key: "AAA".into(), date: d(2023, 2, 1), price: 12.0 },
                PriceRecord { key: "BBB".into(), date: d(2023, 1, 15), price: 5.0 },
            ]
        );
    }

    #[test]
    fn drops_bad_rows_and_reports_lines() {
        let text = "Date,TICKER,Close_Price_Raw\n\
                    ,AAA,9.0\n\
                    2023-01-01,AAA,abc\n\
                    2023-01-02,,3.0\n\
                    2023-13-40,AAA,3.0\n\
                    2023-01-03,AAA,NaN\n\
                    2023-01-04,AAA,4.5\n";
        let parsed = parse_text(text).unwrap();
        assert_eq!(parsed.rows_read, 6);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].price, 4.5);

        let reasons: Vec<_> = parsed.dropped.iter().map(|r| (r.line, r.reason.clone())).collect();
        assert_eq!(
            reasons,
            vec![
                (2, DropReason::MissingDate),
                (3, DropReason::InvalidPrice("abc".into())),
                (4, DropReason::MissingKey),
                (5, DropReason::InvalidDate("2023-13-40".into())),
                (6, DropReason::InvalidPrice("NaN".into())),
            ]
        );
    }

    #[test]
    fn header_aliases_are_case_insensitive_and_order_independent() {
        let text = "\u{feff}PRICE, Symbol ,date\n101.5,XYZ,2024-03-01\n";
        let parsed = parse_text(text).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].key, "XYZ");
        assert_eq!(parsed.records[0].date, d(2024, 3, 1));
    }

    #[test]
    fn ragged_rows_are_dropped_not_fatal() {
        let text = "Date,TICKER,Close_Price_Raw\n2023-01-01,AAA\n2023-01-02,AAA,1.0\n2023-01-03,AAA,\n";
        let parsed = parse_text(text).unwrap();
        assert_eq!(parsed.records.len(), 1);
        let reasons: Vec<_> = parsed.dropped.iter().map(|r| (r.line, r.reason.clone())).collect();
        assert_eq!(reasons, vec![(2, DropReason::MissingPrice), (4, DropReason::MissingPrice)]);
    }

    #[test]
    fn invalid_utf8_row_is_dropped_and_parsing_continues() {
        let bytes: &[u8] = b"Date,TICKER,Close_Price_Raw\n2023-01-01,A\xffA,1.0\n2023-01-02,AAA,2.0\n";
        let parsed = parse_records(bytes).unwrap();
        assert_eq!(parsed.rows_read, 2);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].key, "AAA");
        assert_eq!(parsed.dropped.len(), 1);
        assert!(matches!(parsed.dropped[0].reason, DropReason::Undecodable(_)));
    }

    /// Yields `head` once, then fails every read.
    struct FailingReader {
        head: Option<&'static [u8]>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.head.take() {
                Some(head) => {
                    let n = head.len().min(buf.len());
                    buf[..n].copy_from_slice(&head[..n]);
                    Ok(n)
                }
                None => Err(std::io::Error::other("connection reset")),
            }
        }
    }

    #[test]
    fn io_failure_mid_stream_is_structural() {
        let reader = FailingReader {
            head: Some(b"Date,TICKER,Close_Price_Raw\n2023-01-01,AAA,1.0\n"),
        };
        let err = parse_records(reader).unwrap_err();
        assert!(matches!(err, DataSourceError::Read(_)));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let text = "Date,TICKER,Close_Price_Raw\n\n2023-01-01,AAA,1.0\n\n";
        let parsed = parse_text(text).unwrap();
        assert_eq!(parsed.rows_read, 1);
        assert!(parsed.dropped.is_empty());
    }

    #[test]
    fn missing_column_is_structural() {
        let err = parse_text("Date,TICKER\n2023-01-01,AAA\n").unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn { field: "price", .. }));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = parse_text("").unwrap_err();
        assert!(matches!(err, DataSourceError::MissingHeader));
    }

    #[test]
    fn accepts_alternate_date_formats() {
        assert_eq!(parse_date("2023/01/05"), Some(d(2023, 1, 5)));
        assert_eq!(parse_date("05/01/2023"), Some(d(2023, 1, 5)));
        assert_eq!(parse_date("not a date"), None);
    }
}
