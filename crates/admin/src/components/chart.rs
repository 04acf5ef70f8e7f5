//! Bar charts for the dashboard and analytics pages.
//!
//! Bars are SVG rects whose height is a percentage of the tallest bar, so no
//! charting script or inline style is needed.

use ayucan_core::Money;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::api::SalesPoint;

/// One bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub label: String,
    /// Tooltip text.
    pub value: String,
    /// Height in percent of the chart, 0 to 100.
    pub height: u8,
}

impl Bar {
    /// Distance from the top of the chart, for the SVG `y` attribute.
    #[must_use]
    pub const fn offset(&self) -> u8 {
        100u8.saturating_sub(self.height)
    }
}

/// A titled bar chart.
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Revenue per bucket.
    #[must_use]
    pub fn revenue(title: &str, points: &[SalesPoint]) -> Self {
        let values: Vec<Decimal> = points.iter().map(|p| p.revenue.amount()).collect();
        Self::build(title, points, &values, |p| p.revenue.display())
    }

    /// Order count per bucket.
    #[must_use]
    pub fn orders(title: &str, points: &[SalesPoint]) -> Self {
        let values: Vec<Decimal> = points.iter().map(|p| Decimal::from(p.orders)).collect();
        Self::build(title, points, &values, |p| format!("{} orders", p.orders))
    }

    fn build(
        title: &str,
        points: &[SalesPoint],
        values: &[Decimal],
        describe: impl Fn(&SalesPoint) -> String,
    ) -> Self {
        let bars = points
            .iter()
            .zip(scale_heights(values))
            .map(|(point, height)| Bar {
                label: point.label.clone(),
                value: format!("{}: {}", point.label, describe(point)),
                height,
            })
            .collect();
        Self {
            title: title.to_string(),
            bars,
        }
    }
}

/// Scale values to percentages of the largest one.
///
/// Negative values draw as zero and an all-zero series stays flat.
#[must_use]
pub fn scale_heights(values: &[Decimal]) -> Vec<u8> {
    let max = values.iter().copied().max().unwrap_or(Decimal::ZERO);
    if max <= Decimal::ZERO {
        return vec![0; values.len()];
    }
    values
        .iter()
        .map(|value| {
            let pct = ((*value).max(Decimal::ZERO) * Decimal::ONE_HUNDRED / max)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            pct.to_u8().unwrap_or(100).min(100)
        })
        .collect()
}

/// Sum of revenue across a series.
#[must_use]
pub fn total_revenue(points: &[SalesPoint]) -> Money {
    points.iter().map(|p| p.revenue).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn point(label: &str, revenue: i64, orders: u64) -> SalesPoint {
        SalesPoint {
            label: label.to_string(),
            revenue: Money::from_rupees(revenue),
            orders,
        }
    }

    #[test]
    fn test_heights_relative_to_max() {
        let values = [Decimal::from(50), Decimal::from(200), Decimal::from(1), Decimal::ZERO];
        assert_eq!(scale_heights(&values), vec![25, 100, 1, 0]);
    }

    #[test]
    fn test_flat_and_negative_series() {
        assert_eq!(scale_heights(&[Decimal::ZERO, Decimal::ZERO]), vec![0, 0]);
        assert_eq!(scale_heights(&[Decimal::from(-5)]), vec![0]);
        assert_eq!(
            scale_heights(&[Decimal::from(-5), Decimal::from(10)]),
            vec![0, 100]
        );
        assert!(scale_heights(&[]).is_empty());
    }

    #[test]
    fn test_revenue_chart() {
        let points = [point("Mon", 1000, 4), point("Tue", 4000, 9)];
        let chart = BarChart::revenue("Revenue", &points);
        assert_eq!(chart.bars[0].height, 25);
        assert_eq!(chart.bars[1].value, "Tue: ₹4,000.00");
        assert_eq!(total_revenue(&points), Money::from_rupees(5000));

        let orders = BarChart::orders("Orders", &points);
        assert_eq!(orders.bars[1].height, 100);
        assert_eq!(orders.bars[0].value, "Mon: 4 orders");
    }
}
