//! Defines the financial record, the unit of data the dashboard aggregates.

use time::{Date, OffsetDateTime};

use crate::Error;

/// The category that marks a record as income. Compared case-insensitively.
pub const INCOME_CATEGORY: &str = "salary";

/// The category given to records that arrive without one.
pub const OTHER_CATEGORY: &str = "Other";

/// A single financial transaction, e.g. a salary payment or a grocery bill.
///
/// To create a new `Record`, use [Record::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The grouping key for the category breakdown, e.g. "Rent" or "Salary".
    ///
    /// Never empty.
    pub category: String,
    /// The amount of money spent or earned.
    ///
    /// The sign only matters for the net total, income and expenses are
    /// decided by [Record::category]. Always finite.
    pub amount: f64,
    /// A text description of what the record was for. Display only.
    pub description: String,
    /// When the transaction happened. Display only.
    pub date: Date,
}

impl Record {
    /// Start building a record.
    ///
    /// Shortcut for [RecordBuilder] for discoverability.
    pub fn build(category: &str, amount: f64) -> RecordBuilder {
        RecordBuilder {
            category: category.to_owned(),
            amount,
            description: String::new(),
            date: None,
        }
    }

    /// Whether this record counts towards income rather than expenses.
    pub fn is_income(&self) -> bool {
        self.category.to_lowercase() == INCOME_CATEGORY
    }
}

/// A builder for [Record] that enforces the record schema in
/// [RecordBuilder::finalize].
///
/// # Examples
///
/// ```
/// use finsight::Record;
/// use time::macros::date;
///
/// let record = Record::build("Groceries", -45.99)
///     .description("Weekly shop")
///     .date(date!(2025 - 01 - 15))
///     .finalize()
///     .unwrap();
///
/// assert!(!record.is_income());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBuilder {
    category: String,
    amount: f64,
    description: String,
    date: Option<Date>,
}

impl RecordBuilder {
    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the date. Defaults to today (UTC).
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// Validate the fields and create the [Record].
    ///
    /// A blank category is replaced with [OTHER_CATEGORY].
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is NaN or infinite.
    pub fn finalize(self) -> Result<Record, Error> {
        if !self.amount.is_finite() {
            return Err(Error::InvalidAmount(self.amount.to_string()));
        }

        let category = if self.category.trim().is_empty() {
            OTHER_CATEGORY.to_owned()
        } else {
            self.category
        };

        Ok(Record {
            category,
            amount: self.amount,
            description: self.description,
            date: self
                .date
                .unwrap_or_else(|| OffsetDateTime::now_utc().date()),
        })
    }
}
