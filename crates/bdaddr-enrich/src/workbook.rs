//! Spreadsheet input and output
//!
//! Input is one sheet of an `.xlsx` workbook read with calamine; the first row
//! is the header. Output is a new workbook with the untouched input on an
//! "Original" sheet and the enriched rows on an "Enriched" sheet.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::{EnrichError, Result};
use crate::pipeline::EnrichedRow;

pub const ORIGINAL_SHEET: &str = "Original";
pub const ENRICHED_SHEET: &str = "Enriched";
pub const DISTRICT_COLUMN: &str = "District";
pub const THANA_COLUMN: &str = "Thana";
pub const SOURCE_COLUMN: &str = "resolution_source";
pub const SAMPLE_SHEET: &str = "Addresses";

/// Example input rows, offered as a download
pub const SAMPLE_ADDRESSES_CSV: &str = include_str!("../data/sample_addresses.csv");

/// Header fragments that mark an address column, checked after an exact "address"
const ADDRESS_HINTS: &[&str] = &["address", "addr", "ঠিকানা"];

/// Number formats for dates read from the input, by what the serial holds
const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DURATION_FORMAT: &str = "[h]:mm:ss";

/// One spreadsheet cell, keeping the type it was read with
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel date serial (days since 1899-12-30, time as the fraction)
    DateTime(f64),
    /// Excel duration in days
    Duration(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(text) => Cell::Text(text.clone()),
            Data::Float(number) => Cell::Number(*number),
            Data::Int(number) => Cell::Number(*number as f64),
            Data::Bool(flag) => Cell::Bool(*flag),
            Data::DateTime(value) if value.is_duration() => Cell::Duration(value.as_f64()),
            Data::DateTime(value) => Cell::DateTime(value.as_f64()),
            // ISO strings and error values are kept as the text Excel shows
            other => Cell::Text(other.to_string()),
        }
    }

    fn write_to(&self, sheet: &mut Worksheet, row: u32, col: u16) -> Result<()> {
        match self {
            Cell::Empty => {},
            Cell::Text(text) => {
                sheet.write_string(row, col, text)?;
            },
            Cell::Number(number) => {
                sheet.write_number(row, col, *number)?;
            },
            Cell::Bool(flag) => {
                sheet.write_boolean(row, col, *flag)?;
            },
            Cell::DateTime(serial) => {
                let format = Format::new().set_num_format(if serial.fract() == 0.0 {
                    DATE_FORMAT
                } else {
                    DATETIME_FORMAT
                });
                sheet.write_number_with_format(row, col, *serial, &format)?;
            },
            Cell::Duration(days) => {
                let format = Format::new().set_num_format(DURATION_FORMAT);
                sheet.write_number_with_format(row, col, *days, &format)?;
            },
        }
        Ok(())
    }
}

fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            },
            Cell::Number(number) => write!(f, "{number}"),
            Cell::Bool(flag) => write!(f, "{}", if *flag { "TRUE" } else { "FALSE" }),
            Cell::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(dt) if serial.fract() == 0.0 => write!(f, "{}", dt.format("%Y-%m-%d")),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{serial}"),
            },
            Cell::Duration(days) => {
                let seconds = (days * 86_400.0).round() as i64;
                write!(f, "{}:{:02}:{:02}", seconds / 3600, seconds % 3600 / 60, seconds % 60)
            },
        }
    }
}

/// A sheet: header plus rows of equal width
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Position of a header, compared trimmed and case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// Resolve the address column: the one asked for, else a detected one,
    /// else the first column
    pub fn address_column(&self, requested: Option<&str>) -> Result<usize> {
        match requested.map(str::trim).filter(|r| !r.is_empty()) {
            Some(name) => self
                .column_index(name)
                .ok_or_else(|| EnrichError::missing_column(name, &self.headers)),
            None => match detect_address_column(&self.headers) {
                Some(index) => Ok(index),
                None if !self.headers.is_empty() => {
                    debug!(
                        column = %self.headers[0],
                        "No address-like header, using the first column"
                    );
                    Ok(0)
                },
                None => Err(EnrichError::missing_column("address", &self.headers)),
            },
        }
    }
}

/// Find the address column by header name
pub fn detect_address_column(headers: &[String]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    lowered.iter().position(|h| h == "address").or_else(|| {
        lowered
            .iter()
            .position(|h| ADDRESS_HINTS.iter().any(|hint| h.contains(hint)))
    })
}

/// Read the sheet at `sheet_index` from an in-memory `.xlsx`
pub fn read_xlsx(bytes: &[u8], sheet_index: usize) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| EnrichError::unreadable(format!("not a valid .xlsx file ({e})")))?;

    let sheet_count = workbook.sheet_names().len();
    let range = workbook
        .worksheet_range_at(sheet_index)
        .ok_or_else(|| {
            EnrichError::unreadable(format!(
                "sheet index {sheet_index} out of range, the workbook has {sheet_count} sheet(s)"
            ))
        })?
        .map_err(|e| EnrichError::unreadable(format!("failed to read sheet {sheet_index} ({e})")))?;

    // calamine trims leading empty columns; put them back so positions survive.
    let leading = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut rows = range.rows().map(|row| {
        std::iter::repeat(Cell::Empty)
            .take(leading)
            .chain(row.iter().map(Cell::from_data))
            .collect::<Vec<_>>()
    });

    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
        None => return Err(EnrichError::unreadable("the sheet is empty")),
    };

    let mut body: Vec<Vec<Cell>> = rows.collect();
    while body.last().is_some_and(|row| row.iter().all(Cell::is_blank)) {
        body.pop();
    }

    debug!(columns = headers.len(), rows = body.len(), sheet_index, "Read workbook");
    Ok(Table::new(headers, body))
}

pub fn read_xlsx_path(path: impl AsRef<Path>, sheet_index: usize) -> Result<Table> {
    let bytes = std::fs::read(path.as_ref())?;
    read_xlsx(&bytes, sheet_index)
}

/// The sample addresses as a one-sheet workbook
pub fn sample_workbook() -> Result<Vec<u8>> {
    let mut reader = csv::Reader::from_reader(SAMPLE_ADDRESSES_CSV.as_bytes());
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|v| Cell::Text(v.to_string())).collect());
    }

    let mut workbook = Workbook::new();
    write_table(&mut workbook, SAMPLE_SHEET, &Table::new(headers, rows))?;
    Ok(workbook.save_to_buffer()?)
}

/// Build the two-sheet output workbook
pub fn write_enriched(table: &Table, rows: &[EnrichedRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    write_table(&mut workbook, ORIGINAL_SHEET, table)?;

    let layout = OutputLayout::for_headers(&table.headers);
    let enriched = workbook.add_worksheet();
    enriched.set_name(ENRICHED_SHEET)?;
    write_header(enriched, &layout.headers, &bold)?;
    for (i, row) in rows.iter().enumerate() {
        let r = row_num(i + 1);
        for (j, (_, cell)) in row.original.iter().enumerate() {
            if j != layout.district && j != layout.thana {
                cell.write_to(enriched, r, col_num(j))?;
            }
        }

        let existing = |col: usize| row.original.get(col).filter(|(_, cell)| !cell.is_blank());
        match existing(layout.district) {
            Some((_, cell)) => cell.write_to(enriched, r, col_num(layout.district))?,
            None => {
                enriched.write_string(r, col_num(layout.district), row.resolution.district_label())?;
            },
        }
        match existing(layout.thana) {
            Some((_, cell)) => cell.write_to(enriched, r, col_num(layout.thana))?,
            None => {
                enriched.write_string(r, col_num(layout.thana), row.resolution.thana_label())?;
            },
        }
        enriched.write_string(r, col_num(layout.source), row.source.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Add a sheet holding `table` as it is
fn write_table(workbook: &mut Workbook, name: &str, table: &Table) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    write_header(sheet, &table.headers, &Format::new().set_bold())?;
    for (i, row) in table.rows.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            cell.write_to(sheet, row_num(i + 1), col_num(j))?;
        }
    }
    Ok(())
}

fn write_header(sheet: &mut Worksheet, headers: &[String], format: &Format) -> Result<()> {
    for (j, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col_num(j), header, format)?;
    }
    Ok(())
}

/// Where District, Thana and the source land in the "Enriched" sheet
struct OutputLayout {
    headers: Vec<String>,
    district: usize,
    thana: usize,
    source: usize,
}

impl OutputLayout {
    fn for_headers(input: &[String]) -> Self {
        let mut headers = input.to_vec();
        let mut place = |name: &str| {
            let found = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name));
            found.unwrap_or_else(|| {
                headers.push(name.to_string());
                headers.len() - 1
            })
        };
        let district = place(DISTRICT_COLUMN);
        let thana = place(THANA_COLUMN);
        headers.push(SOURCE_COLUMN.to_string());
        let source = headers.len() - 1;

        Self {
            headers,
            district,
            thana,
            source,
        }
    }
}

// Out-of-range positions saturate and are rejected by the writer.
fn row_num(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

fn col_num(j: usize) -> u16 {
    u16::try_from(j).unwrap_or(u16::MAX)
}
