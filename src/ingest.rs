//! Functions to read financial records from CSV and JSON files.
//!
//! This is where the record schema is enforced: categories default to
//! [OTHER_CATEGORY](crate::record::OTHER_CATEGORY), amounts must be finite
//! numbers and dates must be ISO 8601 calendar dates.

use std::{fs, path::Path};

use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, record::Record};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A CSV row before validation. Every column is optional so that the error
/// for a missing value can name the row.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

/// A JSON object before validation. Amounts may be numbers or strings.
#[derive(Debug, Deserialize)]
struct JsonRow {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    amount: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

/// Read the records in the file at `path`.
///
/// Files ending in `.json` are parsed with [parse_records_json], anything
/// else with [parse_records_csv].
///
/// # Errors
/// Returns [Error::RecordFileError] if the file cannot be read, otherwise
/// any error from the parser.
pub fn load_records(path: &Path) -> Result<Vec<Record>, Error> {
    let text = fs::read_to_string(path).map_err(|error| {
        tracing::error!("Could not read record file {}: {error}", path.display());
        Error::RecordFileError(path.display().to_string(), error.to_string())
    })?;

    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    let records = if is_json {
        parse_records_json(&text)?
    } else {
        parse_records_csv(&text)?
    };

    tracing::info!("Loaded {} records from {}", records.len(), path.display());

    Ok(records)
}

/// Parses records from CSV text.
///
/// The header row must name a `category` and an `amount` column, and may
/// name `description` and `date` columns. Header names are matched ignoring
/// case and surrounding whitespace, and column order does not matter.
///
/// # Errors
/// Returns [Error::InvalidCSV] if the text is not valid CSV or lacks the
/// required columns, and [Error::InvalidRecord] naming the line of the first
/// row that breaks the record schema.
pub fn parse_records_csv(text: &str) -> Result<Vec<Record>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_reader(text.as_bytes());

    let headers: csv::StringRecord = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();

    for required in ["category", "amount"] {
        if !headers.iter().any(|header| header == required) {
            return Err(Error::InvalidCSV(format!(
                "missing the '{required}' column in the header"
            )));
        }
    }

    reader.set_headers(headers.clone());

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|error| Error::InvalidCSV(error.to_string()))?;
        let line = row.position().map_or(0, |position| position.line());
        let position = format!("line {line}");

        let row: CsvRow = row
            .deserialize(Some(&headers))
            .map_err(|error| invalid_record(&position, &error.to_string()))?;

        let amount = match row.amount.as_deref().map(str::trim) {
            None | Some("") => return Err(invalid_record(&position, "missing amount")),
            Some(text) => parse_amount(text, &position)?,
        };

        records.push(build_record(
            row.category,
            amount,
            row.description,
            row.date,
            &position,
        )?);
    }

    Ok(records)
}

/// Parses records from a JSON array of objects.
///
/// Each object takes the same fields as the CSV columns. `amount` may be a
/// JSON number or a string holding a number.
///
/// # Errors
/// Returns [Error::InvalidJSON] if the text is not a JSON array of objects,
/// and [Error::InvalidRecord] naming the first entry (counting from 1) that
/// breaks the record schema.
pub fn parse_records_json(text: &str) -> Result<Vec<Record>, Error> {
    let rows: Vec<JsonRow> =
        serde_json::from_str(text).map_err(|error| Error::InvalidJSON(error.to_string()))?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let position = format!("entry {}", index + 1);

            let amount = match row.amount {
                None | Some(serde_json::Value::Null) => {
                    return Err(invalid_record(&position, "missing amount"));
                }
                Some(serde_json::Value::Number(number)) => number
                    .as_f64()
                    .ok_or_else(|| invalid_record(&position, "amount is out of range"))?,
                Some(serde_json::Value::String(text)) => parse_amount(text.trim(), &position)?,
                Some(other) => {
                    return Err(invalid_record(
                        &position,
                        &format!("amount {other} is not a number"),
                    ));
                }
            };

            build_record(row.category, amount, row.description, row.date, &position)
        })
        .collect()
}

fn parse_amount(text: &str, position: &str) -> Result<f64, Error> {
    text.parse::<f64>()
        .map_err(|_| invalid_record(position, &format!("amount \"{text}\" is not a number")))
}

fn parse_date(text: &str, position: &str) -> Result<Date, Error> {
    Date::parse(text, DATE_FORMAT).map_err(|error| {
        invalid_record(
            position,
            &format!("date \"{text}\" is not a YYYY-MM-DD date: {error}"),
        )
    })
}

fn build_record(
    category: Option<String>,
    amount: f64,
    description: Option<String>,
    date: Option<String>,
    position: &str,
) -> Result<Record, Error> {
    let mut builder = Record::build(category.as_deref().unwrap_or_default(), amount)
        .description(description.as_deref().unwrap_or_default());

    if let Some(date) = date.as_deref().map(str::trim).filter(|date| !date.is_empty()) {
        builder = builder.date(parse_date(date, position)?);
    }

    builder
        .finalize()
        .map_err(|error| invalid_record(position, &error.to_string()))
}

fn invalid_record(position: &str, reason: &str) -> Error {
    Error::InvalidRecord(position.to_owned(), reason.to_owned())
}
