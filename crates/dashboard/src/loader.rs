//! Reads the cleaned business export into engine rows.
//!
//! The export is one CSV row per business with a stable id, a star rating,
//! a free-form category list, coordinates and one hours column per weekday
//! (`"HH:MM-HH:MM"` or `"Closed"`). Businesses closed all seven days carry
//! no plottable signal and are dropped here; everything else is kept, with
//! malformed cells surfacing as row-numbered errors.

use crate::error::{DashboardError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use std::io::Read;
use std::path::Path;
use viz_engine::{CLOSED_TOKEN, Row, RowId, Value, Weekday};

const COL_BUSINESS_ID: &str = "business_id";
const COL_NAME: &str = "name";
const COL_STARS: &str = "stars";
const COL_CATEGORIES: &str = "categories";
const COL_LATITUDE: &str = "latitude";
const COL_LONGITUDE: &str = "longitude";
const COL_YEAR: &str = "year";

pub fn read_rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| DashboardError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_rows(file)
}

/// Reads business rows from any reader. Row ids are assigned in file
/// order over the kept rows and stay stable for the lifetime of the
/// resulting store.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let header = Header::locate(&mut csv_reader)?;

    let mut rows = Vec::new();
    let mut dropped_closed = 0usize;
    let mut next_id = 0u64;

    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row_number = i + 2; // 1-indexed, plus the header line

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if header.closed_all_week(&record) {
            dropped_closed += 1;
            continue;
        }

        rows.push(header.parse_record(&record, row_number, RowId(next_id))?);
        next_id += 1;
    }

    debug!(
        "loaded {} businesses ({dropped_closed} closed all week dropped)",
        rows.len()
    );
    Ok(rows)
}

/// Column positions resolved from the header line.
struct Header {
    business_id: usize,
    name: Option<usize>,
    stars: usize,
    categories: usize,
    latitude: usize,
    longitude: usize,
    year: Option<usize>,
    hours: [(Weekday, usize); 7],
}

impl Header {
    fn locate<R: Read>(reader: &mut csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
        };
        let find_optional =
            |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let mut hours = [(Weekday::Monday, 0usize); 7];
        for (slot, day) in hours.iter_mut().zip(Weekday::ALL) {
            *slot = (day, find(&day.hours_column())?);
        }

        Ok(Self {
            business_id: find(COL_BUSINESS_ID)?,
            name: find_optional(COL_NAME),
            stars: find(COL_STARS)?,
            categories: find(COL_CATEGORIES)?,
            latitude: find(COL_LATITUDE)?,
            longitude: find(COL_LONGITUDE)?,
            year: find_optional(COL_YEAR),
            hours,
        })
    }

    fn closed_all_week(&self, record: &StringRecord) -> bool {
        self.hours
            .iter()
            .all(|&(_, idx)| record.get(idx).unwrap_or("") == CLOSED_TOKEN)
    }

    fn parse_record(&self, record: &StringRecord, row_number: usize, id: RowId) -> Result<Row> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let mut row = Row::new(id)
            .with_cell(COL_BUSINESS_ID, field(self.business_id))
            .with_cell(
                COL_STARS,
                parse_num(field(self.stars), row_number, COL_STARS)?,
            )
            .with_cell(COL_CATEGORIES, text_or_missing(field(self.categories)))
            .with_cell(
                COL_LATITUDE,
                parse_num(field(self.latitude), row_number, COL_LATITUDE)?,
            )
            .with_cell(
                COL_LONGITUDE,
                parse_num(field(self.longitude), row_number, COL_LONGITUDE)?,
            );

        if let Some(idx) = self.name {
            row = row.with_cell(COL_NAME, text_or_missing(field(idx)));
        }
        if let Some(idx) = self.year {
            row = row.with_cell(COL_YEAR, parse_num(field(idx), row_number, COL_YEAR)?);
        }
        for &(day, idx) in &self.hours {
            // Raw hours strings are kept verbatim; the derive step parses
            // them and aborts the pipeline on a malformed interval.
            row = row.with_cell(&day.hours_column(), text_or_missing(field(idx)));
        }
        Ok(row)
    }
}

fn text_or_missing(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Missing
    } else {
        Value::Str(raw.to_string())
    }
}

fn parse_num(raw: &str, row: usize, column: &str) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Missing);
    }
    raw.parse::<f64>()
        .map(Value::Num)
        .map_err(|_| DashboardError::CellParse {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "business_id,name,stars,categories,latitude,longitude,\
hours_Monday,hours_Tuesday,hours_Wednesday,hours_Thursday,hours_Friday,hours_Saturday,hours_Sunday";

    fn csv(lines: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for line in lines {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    #[test]
    fn test_reads_basic_rows() {
        let data = csv(&[
            "b1,Golden Wok,4.5,\"Chinese, Restaurants\",39.95,-75.16,\
09:00-21:00,09:00-21:00,09:00-21:00,09:00-21:00,09:00-22:00,10:00-22:00,Closed",
            "b2,Trattoria,3.0,\"Italian, Restaurants\",39.96,-75.17,\
11:00-23:00,11:00-23:00,11:00-23:00,11:00-23:00,11:00-23:00,Closed,Closed",
        ]);
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id(), RowId(0));
        assert_eq!(rows[0].text("business_id"), Some("b1"));
        assert_eq!(rows[0].num("stars"), Some(4.5));
        assert_eq!(rows[1].text("hours_Saturday"), Some("Closed"));
    }

    #[test]
    fn test_drops_rows_closed_all_week() {
        let data = csv(&[
            "b1,Ghost,2.0,Chinese,39.9,-75.1,Closed,Closed,Closed,Closed,Closed,Closed,Closed",
            "b2,Alive,4.0,Thai,39.9,-75.1,09:00-17:00,Closed,Closed,Closed,Closed,Closed,Closed",
        ]);
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("business_id"), Some("b2"));
        // Ids are assigned over kept rows.
        assert_eq!(rows[0].id(), RowId(0));
    }

    #[test]
    fn test_missing_required_column() {
        let data = "business_id,name,categories,latitude,longitude,\
hours_Monday,hours_Tuesday,hours_Wednesday,hours_Thursday,hours_Friday,hours_Saturday,hours_Sunday\n\
b1,X,Chinese,1.0,2.0,Closed,Closed,Closed,Closed,Closed,Closed,09:00-17:00";
        let err = read_rows(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(c) if c == "stars"));
    }

    #[test]
    fn test_bad_numeric_cell_is_row_numbered() {
        let data = csv(&[
            "b1,Ok,4.0,Chinese,39.9,-75.1,09:00-17:00,Closed,Closed,Closed,Closed,Closed,Closed",
            "b2,Bad,many,Chinese,39.9,-75.1,09:00-17:00,Closed,Closed,Closed,Closed,Closed,Closed",
        ]);
        let err = read_rows(data.as_bytes()).unwrap_err();
        match err {
            DashboardError::CellParse { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "stars");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_cells_become_missing() {
        let data = csv(&[
            "b1,,,,39.9,-75.1,09:00-17:00,Closed,Closed,Closed,Closed,Closed,Closed",
        ]);
        let rows = read_rows(data.as_bytes()).unwrap();
        assert!(rows[0].get("stars").is_missing());
        assert!(rows[0].get("categories").is_missing());
        assert!(rows[0].get("name").is_missing());
    }

    #[test]
    fn test_read_from_file() {
        use std::io::Write;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("business.csv");
        let data = csv(&[
            "b1,Cafe,3.5,Polish,39.9,-75.1,08:00-16:00,Closed,Closed,Closed,Closed,Closed,Closed",
        ]);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(data.as_bytes())
            .unwrap();

        let rows = read_rows_from_path(&path).unwrap();
        assert_eq!(rows.len(), 1);

        let missing = read_rows_from_path(dir.path().join("nope.csv"));
        assert!(matches!(missing, Err(DashboardError::ReadFile { .. })));
    }
}
