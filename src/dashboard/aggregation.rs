//! Record aggregation for the dashboard charts.
//!
//! Reduces a list of records into income and expense totals, a per-category
//! breakdown and the net total. Everything here is a pure function of the
//! input records.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    dashboard::palette::{Color, color_for},
    record::Record,
};

/// The total for one category in the category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category exactly as it appears on the records.
    pub category: String,
    /// The sum of the absolute amounts of the records in this category.
    pub amount: f64,
    /// The chart color, assigned by the order the category was first seen.
    pub color: Color,
}

/// Totals derived from a list of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// The sum of the absolute amounts of the income records.
    pub total_income: f64,
    /// The sum of the absolute amounts of all other records.
    pub total_expenses: f64,
    /// One entry per distinct category, largest amount first.
    pub category_breakdown: Vec<CategoryTotal>,
    /// The sum of the signed amounts.
    pub net_monthly: f64,
}

impl AggregateResult {
    /// Whether the result was computed from an empty list of records.
    ///
    /// Every record lands in a breakdown entry, so an empty breakdown means
    /// there were no records.
    pub fn is_empty(&self) -> bool {
        self.category_breakdown.is_empty()
    }

    /// The sum of all breakdown entries.
    pub fn breakdown_total(&self) -> f64 {
        self.category_breakdown
            .iter()
            .map(|entry| entry.amount)
            .sum()
    }
}

/// Aggregate `records` into income/expense totals and a category breakdown.
///
/// Income is any record whose category is "salary" ignoring case, everything
/// else is an expense. The breakdown groups on the exact category string, so
/// "Salary" and "salary" are separate entries. Entries are sorted by amount,
/// largest first, with ties kept in the order the categories were first seen.
pub fn aggregate(records: &[Record]) -> AggregateResult {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    // Categories in discovery order, with the running total for each.
    let mut categories: Vec<(&str, f64)> = Vec::new();
    let mut category_indices: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let amount = record.amount.abs();

        if record.is_income() {
            total_income += amount;
        } else {
            total_expenses += amount;
        }

        let index = *category_indices
            .entry(record.category.as_str())
            .or_insert_with(|| {
                categories.push((record.category.as_str(), 0.0));
                categories.len() - 1
            });
        categories[index].1 += amount;
    }

    let mut category_breakdown: Vec<CategoryTotal> = categories
        .into_iter()
        .enumerate()
        .map(|(index, (category, amount))| CategoryTotal {
            category: category.to_owned(),
            amount,
            color: color_for(index),
        })
        .collect();

    // `sort_by` is stable, which keeps ties in discovery order.
    category_breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    AggregateResult {
        total_income,
        total_expenses,
        category_breakdown,
        net_monthly: net_monthly(records),
    }
}

/// The signed sum of the record amounts.
pub fn net_monthly(records: &[Record]) -> f64 {
    records.iter().map(|record| record.amount).sum()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        dashboard::{
            aggregation::{AggregateResult, aggregate, net_monthly},
            palette::color_for,
        },
        record::Record,
    };

    fn create_test_record(category: &str, amount: f64) -> Record {
        Record::build(category, amount)
            .date(date!(2025 - 06 - 01))
            .finalize()
            .unwrap()
    }

    fn breakdown_pairs(result: &AggregateResult) -> Vec<(&str, f64)> {
        result
            .category_breakdown
            .iter()
            .map(|entry| (entry.category.as_str(), entry.amount))
            .collect()
    }

    #[test]
    fn empty_input_gives_zero_totals() {
        let result = aggregate(&[]);

        assert_eq!(result.total_income, 0.0);
        assert_eq!(result.total_expenses, 0.0);
        assert_eq!(result.net_monthly, 0.0);
        assert!(result.category_breakdown.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn salary_counts_as_income_regardless_of_sign_and_case() {
        let records = vec![
            create_test_record("Salary", 5000.0),
            create_test_record("Rent", -1500.0),
            create_test_record("Salary", -1500.0),
        ];

        let result = aggregate(&records);

        assert_eq!(result.total_income, 6500.0);
        assert_eq!(result.total_expenses, 1500.0);
        assert_eq!(result.net_monthly, 2000.0);
    }

    #[test]
    fn same_case_salary_records_share_a_breakdown_entry() {
        let records = vec![
            create_test_record("Salary", 5000.0),
            create_test_record("Rent", -1500.0),
            create_test_record("Salary", -1500.0),
        ];

        let result = aggregate(&records);

        assert_eq!(
            breakdown_pairs(&result),
            vec![("Salary", 6500.0), ("Rent", 1500.0)]
        );
    }

    #[test]
    fn differently_cased_salary_records_are_separate_entries() {
        let records = vec![
            create_test_record("Salary", 5000.0),
            create_test_record("Rent", -1500.0),
            create_test_record("salary", -1500.0),
        ];

        let result = aggregate(&records);

        // Both still count as income for the two-way split.
        assert_eq!(result.total_income, 6500.0);
        assert_eq!(result.total_expenses, 1500.0);
        assert_eq!(
            breakdown_pairs(&result),
            vec![("Salary", 5000.0), ("Rent", 1500.0), ("salary", 1500.0)]
        );
    }

    #[test]
    fn categories_differing_in_case_are_not_merged() {
        let records = vec![
            create_test_record("Food", 300.0),
            create_test_record("food", 200.0),
        ];

        let result = aggregate(&records);

        assert_eq!(breakdown_pairs(&result), vec![("Food", 300.0), ("food", 200.0)]);
        assert_eq!(result.breakdown_total(), 500.0);
    }

    #[test]
    fn breakdown_is_sorted_by_amount_descending() {
        let records = vec![
            create_test_record("Transport", -50.0),
            create_test_record("Rent", -1500.0),
            create_test_record("Food", -300.0),
            create_test_record("Transport", -20.0),
        ];

        let result = aggregate(&records);

        assert_eq!(
            breakdown_pairs(&result),
            vec![("Rent", 1500.0), ("Food", 300.0), ("Transport", 70.0)]
        );
    }

    #[test]
    fn ties_keep_discovery_order() {
        let records = vec![
            create_test_record("Zebra", -10.0),
            create_test_record("Alpha", -10.0),
            create_test_record("Middle", -10.0),
        ];

        let result = aggregate(&records);

        assert_eq!(
            breakdown_pairs(&result),
            vec![("Zebra", 10.0), ("Alpha", 10.0), ("Middle", 10.0)]
        );
    }

    #[test]
    fn colors_follow_discovery_order_not_display_order() {
        let records = vec![
            create_test_record("Transport", -50.0),
            create_test_record("Rent", -1500.0),
            create_test_record("Food", -300.0),
        ];

        let result = aggregate(&records);

        let color_of = |category: &str| {
            result
                .category_breakdown
                .iter()
                .find(|entry| entry.category == category)
                .unwrap()
                .color
        };
        assert_eq!(color_of("Transport"), color_for(0));
        assert_eq!(color_of("Rent"), color_for(1));
        assert_eq!(color_of("Food"), color_for(2));
    }

    #[test]
    fn colors_are_stable_when_display_order_changes() {
        let before = vec![
            create_test_record("Food", -300.0),
            create_test_record("Rent", -100.0),
        ];
        // Same discovery order, but Rent now outranks Food.
        let after = vec![
            create_test_record("Food", -300.0),
            create_test_record("Rent", -100.0),
            create_test_record("Rent", -900.0),
        ];

        let before = aggregate(&before);
        let after = aggregate(&after);

        assert_eq!(before.category_breakdown[0].category, "Food");
        assert_eq!(after.category_breakdown[0].category, "Rent");
        assert_eq!(
            before.category_breakdown[0].color,
            after.category_breakdown[1].color
        );
        assert_eq!(
            before.category_breakdown[1].color,
            after.category_breakdown[0].color
        );
    }

    #[test]
    fn colors_wrap_after_palette_is_exhausted() {
        let records: Vec<_> = (0..17)
            .map(|i| create_test_record(&format!("Category {i}"), -(100.0 - i as f64)))
            .collect();

        let result = aggregate(&records);

        assert_eq!(result.category_breakdown.len(), 17);
        assert_eq!(result.category_breakdown[15].color, color_for(0));
        assert_eq!(result.category_breakdown[16].color, color_for(1));
    }

    #[test]
    fn split_totals_sum_to_absolute_total() {
        let records = vec![
            create_test_record("Salary", 4200.5),
            create_test_record("Rent", -1500.25),
            create_test_record("Food", 80.0),
            create_test_record("SALARY", -10.0),
            create_test_record("Other", -0.25),
        ];

        let result = aggregate(&records);
        let absolute_total: f64 = records.iter().map(|record| record.amount.abs()).sum();

        assert_eq!(result.total_income + result.total_expenses, absolute_total);
        assert_eq!(result.total_income, 4210.5);
    }

    #[test]
    fn breakdown_partitions_every_record() {
        let records = vec![
            create_test_record("Food", -12.0),
            create_test_record("Rent", -800.0),
            create_test_record("Food", -8.0),
            create_test_record("Salary", 3000.0),
        ];

        let result = aggregate(&records);

        assert_eq!(result.category_breakdown.len(), 3);
        for entry in &result.category_breakdown {
            let want: f64 = records
                .iter()
                .filter(|record| record.category == entry.category)
                .map(|record| record.amount.abs())
                .sum();
            assert_eq!(entry.amount, want, "category {}", entry.category);
        }
    }

    #[test]
    fn net_monthly_is_signed_sum() {
        let records = vec![
            create_test_record("Salary", 1000.0),
            create_test_record("Rent", -1500.0),
            create_test_record("Refund", 25.0),
        ];

        assert_eq!(net_monthly(&records), -475.0);
        assert_eq!(aggregate(&records).net_monthly, -475.0);
    }

    #[test]
    fn repeated_aggregation_is_identical() {
        let records = vec![
            create_test_record("Food", -300.0),
            create_test_record("Rent", -300.0),
            create_test_record("Salary", 900.0),
        ];

        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
