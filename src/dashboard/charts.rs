//! Chart builders for the dashboard page.
//!
//! Produces ECharts configurations for the spending-by-category donut and
//! the monthly spending bar chart.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisType, Color, Tooltip, Trigger},
    series::{Pie, bar},
};

use crate::{
    aggregation::{CategoryTotal, MonthlyTotal},
    category::{Category, category_display_color, category_display_name},
    chart::{currency_formatter, currency_tooltip},
    month::short_month_name,
};

/// Number of months shown by the monthly spending chart.
const MONTHLY_CHART_MONTHS: usize = 6;

/// Build the spending-by-category donut from per-category expense totals.
///
/// Slice colors come from the category registry. Categories without any
/// spending are left out so they do not crowd the legend.
pub(super) fn spending_by_category_chart(
    totals: &[CategoryTotal],
    categories: &[Category],
) -> Chart {
    let spending: Vec<&CategoryTotal> = totals.iter().filter(|entry| entry.total > 0.0).collect();

    let colors: Vec<Color> = spending
        .iter()
        .map(|entry| Color::from(category_display_color(categories, Some(&entry.category_id))))
        .collect();
    let slices: Vec<(f64, &str)> = spending
        .iter()
        .map(|entry| {
            (
                entry.total,
                category_display_name(categories, Some(&entry.category_id)),
            )
        })
        .collect();

    Chart::new()
        .color(colors)
        .title(Title::new().text("Spending by Category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("1%").right("4%"))
        .series(Pie::new().radius(vec!["45%", "70%"]).data(slices))
}

/// Build the monthly spending bar chart over the most recent months present
/// in the expense data.
pub(super) fn monthly_spending_chart(monthly_totals: &[MonthlyTotal]) -> Chart {
    let recent =
        &monthly_totals[monthly_totals.len().saturating_sub(MONTHLY_CHART_MONTHS)..];

    let labels: Vec<String> = recent
        .iter()
        .map(|entry| short_month_name(entry.month).to_owned())
        .collect();
    let values: Vec<f64> = recent.iter().map(|entry| entry.total).collect();

    Chart::new()
        .title(Title::new().text("Monthly Spending"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(bar::Bar::new().name("Spending").data(values))
}

#[cfg(test)]
mod dashboard_chart_tests {
    use crate::{
        aggregation::{CategoryTotal, MonthlyTotal},
        category::Category,
    };

    use super::{monthly_spending_chart, spending_by_category_chart};

    fn test_categories() -> Vec<Category> {
        vec![
            Category {
                id: "food".to_owned(),
                name: "Food & Dining".to_owned(),
                color: "#F87171".to_owned(),
            },
            Category {
                id: "housing".to_owned(),
                name: "Housing".to_owned(),
                color: "#60A5FA".to_owned(),
            },
        ]
    }

    #[test]
    fn donut_skips_categories_without_spending() {
        let categories = test_categories();
        let totals = vec![
            CategoryTotal {
                category_id: "food".to_owned(),
                total: 120.0,
            },
            CategoryTotal {
                category_id: "housing".to_owned(),
                total: 0.0,
            },
        ];

        let options = spending_by_category_chart(&totals, &categories).to_string();

        assert!(options.contains("Food & Dining"));
        assert!(
            !options.contains("Housing"),
            "categories without spending should not appear in the donut"
        );
    }

    #[test]
    fn donut_uses_registry_colors() {
        let categories = test_categories();
        let totals = vec![
            CategoryTotal {
                category_id: "food".to_owned(),
                total: 120.0,
            },
            CategoryTotal {
                category_id: "housing".to_owned(),
                total: 850.0,
            },
        ];

        let options = spending_by_category_chart(&totals, &categories).to_string();

        assert!(options.contains("#F87171"));
        assert!(options.contains("#60A5FA"));
    }

    #[test]
    fn donut_labels_unregistered_categories_as_unknown() {
        let categories = test_categories();
        let totals = vec![CategoryTotal {
            category_id: "cryptids".to_owned(),
            total: 66.6,
        }];

        let options = spending_by_category_chart(&totals, &categories).to_string();

        assert!(options.contains("Unknown"));
    }

    #[test]
    fn monthly_chart_labels_months_by_short_name() {
        let totals = vec![
            MonthlyTotal {
                month: 3,
                total: 80.0,
            },
            MonthlyTotal {
                month: 6,
                total: 120.0,
            },
        ];

        let options = monthly_spending_chart(&totals).to_string();

        assert!(options.contains("Mar"));
        assert!(options.contains("Jun"));
    }

    #[test]
    fn monthly_chart_shows_at_most_the_six_most_recent_months() {
        let totals: Vec<MonthlyTotal> = (1..=8)
            .map(|month| MonthlyTotal {
                month,
                total: f64::from(month) * 10.0,
            })
            .collect();

        let options = monthly_spending_chart(&totals).to_string();

        assert!(!options.contains("Jan"));
        assert!(!options.contains("Feb"));
        assert!(options.contains("Mar"));
        assert!(options.contains("Aug"));
    }
}
