//! Sales analytics endpoints.

use serde::Serialize;
use tracing::instrument;

use super::{ApiError, AuthedApi, SalesPoint, SalesSummary, TopProduct};

/// Preset reporting windows on the analytics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyticsRange {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    Last12Months,
}

impl AnalyticsRange {
    pub const ALL: [Self; 4] = [
        Self::Last7Days,
        Self::Last30Days,
        Self::Last90Days,
        Self::Last12Months,
    ];

    /// Query value (`7d`, `30d`, `90d`, `12m`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Last12Months => "12m",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::Last90Days => "Last 90 days",
            Self::Last12Months => "Last 12 months",
        }
    }

    /// Bucket size for the time series.
    #[must_use]
    pub const fn interval(self) -> &'static str {
        match self {
            Self::Last7Days | Self::Last30Days => "day",
            Self::Last90Days => "week",
            Self::Last12Months => "month",
        }
    }

    /// Parse a query value, falling back to the default range.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::ALL.into_iter().find(|r| r.as_str() == v))
            .unwrap_or_default()
    }
}

#[derive(Serialize)]
struct SeriesParams<'a> {
    range: &'a str,
    interval: &'a str,
}

#[derive(Serialize)]
struct TopParams<'a> {
    range: &'a str,
    limit: u32,
}

#[derive(Serialize)]
struct RangeParams<'a> {
    range: &'a str,
}

fn encode<T: Serialize>(params: &T) -> Result<String, ApiError> {
    serde_urlencoded::to_string(params).map_err(|e| ApiError::Parse(e.to_string()))
}

impl AuthedApi<'_> {
    /// Revenue and order counts bucketed by `interval`.
    #[instrument(skip(self))]
    pub async fn sales_series(
        &self,
        range: AnalyticsRange,
        interval: &str,
    ) -> Result<Vec<SalesPoint>, ApiError> {
        let query = encode(&SeriesParams {
            range: range.as_str(),
            interval,
        })?;
        self.get("analytics/sales", Some(&query)).await
    }

    /// Best sellers by revenue.
    #[instrument(skip(self))]
    pub async fn top_products(
        &self,
        range: AnalyticsRange,
        limit: u32,
    ) -> Result<Vec<TopProduct>, ApiError> {
        let query = encode(&TopParams {
            range: range.as_str(),
            limit,
        })?;
        self.get("analytics/top-products", Some(&query)).await
    }

    #[instrument(skip(self))]
    pub async fn sales_summary(&self, range: AnalyticsRange) -> Result<SalesSummary, ApiError> {
        let query = encode(&RangeParams {
            range: range.as_str(),
        })?;
        self.get("analytics/summary", Some(&query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_from_query() {
        assert_eq!(AnalyticsRange::from_query(Some("7d")), AnalyticsRange::Last7Days);
        assert_eq!(AnalyticsRange::from_query(Some("12m")), AnalyticsRange::Last12Months);
        assert_eq!(AnalyticsRange::from_query(Some("1y")), AnalyticsRange::Last30Days);
        assert_eq!(AnalyticsRange::from_query(None), AnalyticsRange::Last30Days);
    }

    #[test]
    fn test_range_intervals() {
        assert_eq!(AnalyticsRange::Last7Days.interval(), "day");
        assert_eq!(AnalyticsRange::Last90Days.interval(), "week");
        assert_eq!(AnalyticsRange::Last12Months.interval(), "month");
    }
}
