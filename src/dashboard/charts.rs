//! Chart generation for the dashboard.
//!
//! This module creates ECharts visualizations of an [AggregateResult]:
//! - **Income vs Expenses**: two-slice pie of total income and expenses
//! - **Spending by Category**: pie with one slice per category
//! - **Category Breakdown**: bar chart with one bar per category
//!
//! Each chart is generated as JSON configuration for the ECharts library.
//! When there is no data, or the chart cannot be built, a placeholder is
//! rendered instead.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, Color as ChartColor, JsFunction, Label, Tooltip, Trigger},
    series::{Pie, bar},
};
use maud::PreEscaped;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    currency::CurrencyFormat,
    dashboard::{
        aggregation::{AggregateResult, CategoryTotal},
        palette::{EXPENSES_COLOR, INCOME_COLOR},
    },
};

/// Slices at or below this share of the total get no label.
const LABEL_SHARE_THRESHOLD: f64 = 0.05;

/// The HTML element ID of the chart container inside the overlay.
pub(super) const CHART_ELEMENT_ID: &str = "dashboard-chart";

/// The chart views a user can open from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Pie chart of total income against total expenses.
    IncomeExpenses,
    /// Pie chart with one slice per category.
    CategoryPie,
    /// Bar chart with one bar per category.
    CategoryBar,
}

impl ChartKind {
    /// Every chart kind, in the order the dashboard buttons are shown.
    pub const ALL: [ChartKind; 3] = [
        ChartKind::IncomeExpenses,
        ChartKind::CategoryPie,
        ChartKind::CategoryBar,
    ];

    /// The heading shown above the chart.
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::IncomeExpenses => "Income vs Expenses",
            ChartKind::CategoryPie => "Spending by Category",
            ChartKind::CategoryBar => "Category Breakdown",
        }
    }

    /// The value used for this kind in the `chart` query parameter.
    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::IncomeExpenses => "income-expenses",
            ChartKind::CategoryPie => "category-pie",
            ChartKind::CategoryBar => "category-bar",
        }
    }

    /// The text on the dashboard button that opens this chart.
    pub fn button_label(&self) -> &'static str {
        match self {
            ChartKind::IncomeExpenses => "Income vs Expenses",
            ChartKind::CategoryPie => "Category Breakdown (Pie)",
            ChartKind::CategoryBar => "Category Breakdown (Bar)",
        }
    }
}

/// Formatted totals displayed above the income vs expenses chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsSummary {
    /// Total income as currency text.
    pub income: String,
    /// Total expenses as currency text.
    pub expenses: String,
}

/// What to display for a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    /// There is nothing to chart yet.
    Placeholder,
    /// A chart ready for the browser.
    Chart {
        /// The ECharts option object as JSON.
        options: String,
        /// Totals shown alongside the chart, if the chart has any.
        summary: Option<TotalsSummary>,
    },
}

/// A rendered chart view.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    /// The chart that was requested.
    pub kind: ChartKind,
    /// The chart itself or a placeholder.
    pub body: ChartBody,
}

impl ChartView {
    /// The heading for this view.
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Render the chart `kind` for `aggregate`.
///
/// An empty aggregate renders the placeholder for every chart kind. Errors
/// while building the chart are logged and also render the placeholder.
pub fn render_chart(
    kind: ChartKind,
    aggregate: &AggregateResult,
    currency: &CurrencyFormat,
) -> ChartView {
    if aggregate.is_empty() {
        return ChartView {
            kind,
            body: ChartBody::Placeholder,
        };
    }

    let chart = match kind {
        ChartKind::IncomeExpenses => income_expenses_chart(aggregate, currency),
        ChartKind::CategoryPie => category_pie_chart(&aggregate.category_breakdown, currency),
        ChartKind::CategoryBar => Ok(category_bar_chart(&aggregate.category_breakdown, currency)),
    };

    let body = match chart {
        Ok(chart) => ChartBody::Chart {
            options: chart.to_string(),
            summary: (kind == ChartKind::IncomeExpenses).then(|| TotalsSummary {
                income: currency.format(aggregate.total_income),
                expenses: currency.format(aggregate.total_expenses),
            }),
        },
        Err(error) => {
            tracing::error!("Could not build the {} chart: {error}", kind.slug());
            ChartBody::Placeholder
        }
    };

    ChartView { kind, body }
}

/// Generates the JavaScript that initializes the chart in the overlay.
///
/// Disposes of any chart left in the container by a previous overlay and
/// follows the browser's dark mode setting.
pub(super) fn chart_script(options: &str) -> PreEscaped<String> {
    // Category names are user data, so keep them from closing the script tag.
    let options = options.replace("</", "<\\/");

    PreEscaped(format!(
        r#"(function() {{
            const chartDom = document.getElementById("{CHART_ELEMENT_ID}");
            const previous = echarts.getInstanceByDom(chartDom);
            if (previous) {{
                previous.dispose();
            }}
            const chart = echarts.init(chartDom);
            const option = {options};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#
    ))
}

fn income_expenses_chart(
    aggregate: &AggregateResult,
    currency: &CurrencyFormat,
) -> Result<Chart, Error> {
    let total = aggregate.total_income + aggregate.total_expenses;
    let labels = vec![
        percentage_label("Income", share(aggregate.total_income, total)),
        percentage_label("Expenses", share(aggregate.total_expenses, total)),
    ];

    let chart = Chart::new()
        .title(Title::new().text(ChartKind::IncomeExpenses.title()).left("center"))
        .tooltip(item_tooltip(currency))
        .color(vec![
            ChartColor::from(INCOME_COLOR.hex()),
            ChartColor::from(EXPENSES_COLOR.hex()),
        ])
        .series(
            Pie::new()
                .name("Income vs Expenses")
                .radius("60%")
                .label(Label::new().show(true).formatter(slice_label_formatter(&labels)?))
                .data(vec![
                    (aggregate.total_income, "Income"),
                    (aggregate.total_expenses, "Expenses"),
                ]),
        );

    Ok(chart)
}

fn category_pie_chart(
    breakdown: &[CategoryTotal],
    currency: &CurrencyFormat,
) -> Result<Chart, Error> {
    let labels = category_slice_labels(breakdown);

    let chart = Chart::new()
        .title(Title::new().text(ChartKind::CategoryPie.title()).left("center"))
        .tooltip(item_tooltip(currency))
        .legend(Legend::new().top("bottom"))
        .color(category_colors(breakdown))
        .series(
            Pie::new()
                .name("Spending by Category")
                .radius("60%")
                .label(Label::new().show(true).formatter(slice_label_formatter(&labels)?))
                .data(
                    breakdown
                        .iter()
                        .map(|entry| (entry.amount, entry.category.as_str()))
                        .collect(),
                ),
        );

    Ok(chart)
}

fn category_bar_chart(breakdown: &[CategoryTotal], currency: &CurrencyFormat) -> Chart {
    let labels: Vec<String> = breakdown
        .iter()
        .map(|entry| entry.category.clone())
        .collect();

    let mut chart = Chart::new()
        .title(Title::new().text(ChartKind::CategoryBar.title()).left("center"))
        .tooltip(item_tooltip(currency))
        .color(category_colors(breakdown))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .axis_label(AxisLabel::new().rotate(45))
                .data(labels),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency.js_formatter())),
        );

    // One series per category so each bar takes its category's color. The
    // series are stacked so every bar sits centred on its own label.
    for (index, entry) in breakdown.iter().enumerate() {
        chart = chart.series(
            bar::Bar::new()
                .name(entry.category.as_str())
                .stack("Categories")
                .data(bar_values(index, entry.amount, breakdown.len())),
        );
    }

    chart
}

/// The values for the bar series of the category at `index`: its amount at
/// its own position and nothing everywhere else.
fn bar_values(index: usize, amount: f64, category_count: usize) -> Vec<Option<f64>> {
    (0..category_count)
        .map(|position| (position == index).then_some(amount))
        .collect()
}

fn category_colors(breakdown: &[CategoryTotal]) -> Vec<ChartColor> {
    breakdown
        .iter()
        .map(|entry| ChartColor::from(entry.color.hex()))
        .collect()
}

/// Creates a tooltip for a single chart element with its value as currency.
fn item_tooltip(currency: &CurrencyFormat) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Item)
        .value_formatter(currency.js_formatter())
}

/// A label formatter that looks up each slice's precomputed label.
fn slice_label_formatter(labels: &[String]) -> Result<JsFunction, Error> {
    let labels = serde_json::to_string(labels)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(JsFunction::new_with_args(
        "params",
        &format!("const labels = {labels}; return labels[params.dataIndex] ?? '';"),
    ))
}

/// The fraction of `total` that `value` makes up, or zero for an empty total.
fn share(value: f64, total: f64) -> f64 {
    if total > 0.0 { value / total } else { 0.0 }
}

/// A slice label such as "Income 75.0%".
fn percentage_label(name: &str, share: f64) -> String {
    format!("{name} {:.1}%", share * 100.0)
}

/// Labels for the category pie, in breakdown order.
///
/// Small slices get an empty label to avoid clutter. The legend still lists
/// them.
fn category_slice_labels(breakdown: &[CategoryTotal]) -> Vec<String> {
    let total: f64 = breakdown.iter().map(|entry| entry.amount).sum();

    breakdown
        .iter()
        .map(|entry| {
            let share = share(entry.amount, total);

            if share > LABEL_SHARE_THRESHOLD {
                percentage_label(&entry.category, share)
            } else {
                String::new()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        currency::CurrencyFormat,
        dashboard::{
            aggregation::{AggregateResult, aggregate},
            charts::{
                ChartBody, ChartKind, bar_values, category_slice_labels, chart_script,
                percentage_label, render_chart, share,
            },
        },
        record::Record,
    };

    fn create_test_record(category: &str, amount: f64) -> Record {
        Record::build(category, amount)
            .date(date!(2025 - 06 - 01))
            .finalize()
            .unwrap()
    }

    fn sample_aggregate() -> AggregateResult {
        aggregate(&[
            create_test_record("Salary", 3000.0),
            create_test_record("Rent", -600.0),
            create_test_record("Food", -380.0),
            create_test_record("Coffee", -20.0),
        ])
    }

    fn options(kind: ChartKind, aggregate: &AggregateResult) -> String {
        match render_chart(kind, aggregate, &CurrencyFormat::default()).body {
            ChartBody::Chart { options, .. } => options,
            ChartBody::Placeholder => panic!("want a chart for {kind:?}, got the placeholder"),
        }
    }

    #[test]
    fn empty_aggregate_renders_placeholder_for_every_kind() {
        let empty = aggregate(&[]);

        for kind in ChartKind::ALL {
            let view = render_chart(kind, &empty, &CurrencyFormat::default());

            assert_eq!(view.kind, kind);
            assert_eq!(view.body, ChartBody::Placeholder, "{kind:?}");
        }
    }

    #[test]
    fn every_kind_renders_a_chart_with_data() {
        let aggregate = sample_aggregate();

        for kind in ChartKind::ALL {
            let options = options(kind, &aggregate);

            assert!(options.contains(kind.title()), "{kind:?}: {options}");
        }
    }

    #[test]
    fn income_expenses_chart_has_summary() {
        let aggregate = sample_aggregate();

        let view = render_chart(
            ChartKind::IncomeExpenses,
            &aggregate,
            &CurrencyFormat::default(),
        );

        match view.body {
            ChartBody::Chart {
                summary: Some(summary),
                ..
            } => {
                assert_eq!(summary.income, "R3 000,00");
                assert_eq!(summary.expenses, "R1 000,00");
            }
            body => panic!("want a chart with a summary, got {body:?}"),
        }
    }

    #[test]
    fn category_charts_have_no_summary() {
        let aggregate = sample_aggregate();

        for kind in [ChartKind::CategoryPie, ChartKind::CategoryBar] {
            let view = render_chart(kind, &aggregate, &CurrencyFormat::default());

            assert!(
                matches!(view.body, ChartBody::Chart { summary: None, .. }),
                "{kind:?}: {:?}",
                view.body
            );
        }
    }

    #[test]
    fn income_expenses_labels_use_two_value_total() {
        let options = options(ChartKind::IncomeExpenses, &sample_aggregate());

        assert!(options.contains("Income 75.0%"), "{options}");
        assert!(options.contains("Expenses 25.0%"), "{options}");
    }

    #[test]
    fn category_pie_lists_every_category() {
        let options = options(ChartKind::CategoryPie, &sample_aggregate());

        for category in ["Salary", "Rent", "Food", "Coffee"] {
            assert!(options.contains(category), "{category} missing from {options}");
        }
        assert!(options.contains("legend"), "{options}");
    }

    #[test]
    fn category_pie_suppresses_small_slice_labels() {
        let aggregate = sample_aggregate();

        let labels = category_slice_labels(&aggregate.category_breakdown);

        // Total is 4000: Salary 75%, Rent 15%, Food 9.5%, Coffee 0.5%.
        assert_eq!(labels, vec!["Salary 75.0%", "Rent 15.0%", "Food 9.5%", ""]);
    }

    #[test]
    fn slice_at_exactly_five_percent_has_no_label() {
        let aggregate = aggregate(&[
            create_test_record("Rent", -95.0),
            create_test_record("Coffee", -5.0),
        ]);

        let labels = category_slice_labels(&aggregate.category_breakdown);

        assert_eq!(labels, vec!["Rent 95.0%", ""]);
    }

    #[test]
    fn zero_totals_do_not_divide_by_zero() {
        assert_eq!(share(0.0, 0.0), 0.0);
        assert_eq!(percentage_label("Income", share(0.0, 0.0)), "Income 0.0%");

        let aggregate = aggregate(&[create_test_record("Food", 0.0)]);
        assert_eq!(category_slice_labels(&aggregate.category_breakdown), vec![""]);
    }

    #[test]
    fn bar_chart_follows_breakdown_order() {
        let options = options(ChartKind::CategoryBar, &sample_aggregate());

        let positions: Vec<usize> = ["Salary", "Rent", "Food", "Coffee"]
            .iter()
            .map(|category| options.find(category).unwrap())
            .collect();
        assert!(
            positions.windows(2).all(|pair| pair[0] < pair[1]),
            "categories out of order in {options}"
        );
        assert!(options.contains("rotate"), "{options}");
    }

    /// The pretty-printed value of the top-level option `key`.
    #[track_caller]
    fn top_level_option<'a>(options: &'a str, key: &str) -> &'a str {
        let start = options
            .find(&format!("\n  \"{key}\""))
            .unwrap_or_else(|| panic!("option {key} missing from {options}"));
        let rest = &options[start + 1..];
        let end = rest.find("\n  \"").unwrap_or(rest.len());

        &rest[..end]
    }

    #[test]
    fn every_kind_formats_tooltip_values_as_currency() {
        let aggregate = sample_aggregate();

        for kind in ChartKind::ALL {
            let options = options(kind, &aggregate);
            let tooltip = top_level_option(&options, "tooltip");

            assert!(tooltip.contains("\"trigger\": \"item\""), "{kind:?}: {tooltip}");
            assert!(
                tooltip.contains("\"valueFormatter\": function(number)"),
                "{kind:?}: {tooltip}"
            );
            assert!(
                tooltip.contains("Intl.NumberFormat('en-ZA'"),
                "{kind:?}: {tooltip}"
            );
            assert!(tooltip.contains("currency: 'ZAR'"), "{kind:?}: {tooltip}");
        }
    }

    #[test]
    fn bar_chart_axes_use_rotated_labels_and_currency_values() {
        let options = options(ChartKind::CategoryBar, &sample_aggregate());

        let x_axis = top_level_option(&options, "xAxis");
        assert!(x_axis.contains("\"rotate\": 45.0"), "{x_axis}");

        let y_axis = top_level_option(&options, "yAxis");
        assert!(y_axis.contains("\"axisLabel\""), "{y_axis}");
        assert!(
            y_axis.contains("\"formatter\": function(number)"),
            "{y_axis}"
        );
        assert!(y_axis.contains("Intl.NumberFormat('en-ZA'"), "{y_axis}");
    }

    #[test]
    fn bar_values_only_fill_own_position() {
        assert_eq!(bar_values(1, 42.0, 3), vec![None, Some(42.0), None]);
        assert_eq!(bar_values(0, 7.0, 1), vec![Some(7.0)]);
    }

    #[test]
    fn charts_use_category_colors() {
        let aggregate = sample_aggregate();
        let options = options(ChartKind::CategoryPie, &aggregate);

        for entry in &aggregate.category_breakdown {
            assert!(options.contains(entry.color.hex()), "{options}");
        }
    }

    #[test]
    fn chart_script_escapes_closing_tags() {
        let script = chart_script(r#"{"name":"</script><script>alert(1)"}"#);

        assert!(!script.0.contains("</script>"), "{}", script.0);
        assert!(script.0.contains("<\\/script>"), "{}", script.0);
    }
}
