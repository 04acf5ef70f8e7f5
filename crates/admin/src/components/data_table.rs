//! Data table component types.
//!
//! These types define the toolbar (search and filters) and the header row of
//! every list page. Filters submit as a plain GET form, so the current values
//! are carried back into the config before rendering.

use ayucan_core::{OrderStatus, PaymentMode, PaymentStatus, ProductStatus, ReviewStatus};
use serde::Serialize;

use crate::api::Category;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Right-align the column (amounts and counts).
    pub numeric: bool,
}

impl TableColumn {
    /// Create a new text column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            numeric: false,
        }
    }

    /// Create a new right-aligned column.
    #[must_use]
    pub fn numeric(key: &str, label: &str) -> Self {
        Self {
            numeric: true,
            ..Self::new(key, label)
        }
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Text input filter.
    Text,
    /// Single-select dropdown.
    Select,
    /// Date input.
    Date,
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
    /// Whether the option is the current filter value.
    pub selected: bool,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: false,
        }
    }
}

/// Filter definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Filter parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Filter type.
    pub filter_type: FilterType,
    /// Placeholder text (for text inputs).
    pub placeholder: Option<String>,
    /// Available options (for selects).
    pub options: Vec<FilterOption>,
    /// Current value, empty when unset.
    pub value: String,
}

impl TableFilter {
    /// Create a text filter.
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Text,
            placeholder: Some(placeholder.to_string()),
            options: vec![],
            value: String::new(),
        }
    }

    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            placeholder: None,
            options,
            value: String::new(),
        }
    }

    /// Create a date filter.
    #[must_use]
    pub fn date(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Date,
            placeholder: None,
            options: vec![],
            value: String::new(),
        }
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.filter_type == FilterType::Select
    }

    #[must_use]
    pub fn is_date(&self) -> bool {
        self.filter_type == FilterType::Date
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        for option in &mut self.options {
            option.selected = option.value == value;
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Path the toolbar form submits to.
    pub action: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Current search text.
    pub search: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
    /// Whether to show filter controls.
    pub has_filters: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, action: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            action: action.to_string(),
            columns: vec![],
            filters: vec![],
            search_placeholder: "Search...".to_string(),
            search: String::new(),
            empty_title: "No items found".to_string(),
            empty_description: None,
            has_filters: false,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.has_filters = true;
        self.filters.push(filter);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Carry the submitted search and filter values back into the toolbar.
    #[must_use]
    pub fn with_values<'a>(
        mut self,
        search: Option<&str>,
        value_of: impl Fn(&str) -> Option<&'a str>,
    ) -> Self {
        self.search = search.map(str::trim).unwrap_or_default().to_string();
        for filter in &mut self.filters {
            if let Some(value) = value_of(&filter.key) {
                filter.set_value(value.trim());
            }
        }
        self
    }

    /// Number of columns, for `colspan` on the empty row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

fn status_options<T: Copy>(
    all: &[T],
    value: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
) -> Vec<FilterOption> {
    all.iter()
        .map(|s| FilterOption::new(value(*s), label(*s)))
        .collect()
}

/// Products table.
#[must_use]
pub fn products_table_config(categories: &[Category]) -> DataTableConfig {
    DataTableConfig::new("products", "/products")
        .column(TableColumn::new("name", "Product"))
        .column(TableColumn::new("sku", "SKU"))
        .column(TableColumn::new("category", "Category"))
        .column(TableColumn::numeric("price", "Price"))
        .column(TableColumn::numeric("stock", "Stock"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select(
            "category_id",
            "Category",
            categories
                .iter()
                .map(|c| FilterOption::new(c.id.as_str(), &c.name))
                .collect(),
        ))
        .filter(TableFilter::select(
            "status",
            "Status",
            status_options(ProductStatus::ALL, ProductStatus::as_str, ProductStatus::label),
        ))
        .search_placeholder("Search products by name or SKU...")
        .empty_state("No products found", Some("Try a different search or add a product."))
}

/// Categories table.
#[must_use]
pub fn categories_table_config() -> DataTableConfig {
    DataTableConfig::new("categories", "/categories")
        .column(TableColumn::new("name", "Category"))
        .column(TableColumn::new("slug", "Slug"))
        .column(TableColumn::numeric("products", "Products"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::new("actions", ""))
        .search_placeholder("Search categories...")
        .empty_state("No categories found", None)
}

/// Orders table.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    DataTableConfig::new("orders", "/orders")
        .column(TableColumn::new("order", "Order"))
        .column(TableColumn::new("date", "Date"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::numeric("total", "Total"))
        .column(TableColumn::new("payment", "Payment"))
        .column(TableColumn::new("status", "Status"))
        .filter(TableFilter::select(
            "status",
            "Status",
            status_options(OrderStatus::ALL, OrderStatus::as_str, OrderStatus::label),
        ))
        .filter(TableFilter::select(
            "payment_status",
            "Payment",
            status_options(PaymentStatus::ALL, PaymentStatus::as_str, PaymentStatus::label),
        ))
        .filter(TableFilter::date("from", "From"))
        .filter(TableFilter::date("to", "To"))
        .search_placeholder("Search by order number, name or phone...")
        .empty_state("No orders found", Some("Orders appear here once customers check out."))
}

/// Online customers table.
#[must_use]
pub fn customers_table_config() -> DataTableConfig {
    DataTableConfig::new("customers", "/customers")
        .column(TableColumn::new("name", "Customer"))
        .column(TableColumn::new("phone", "Phone"))
        .column(TableColumn::numeric("orders", "Orders"))
        .column(TableColumn::numeric("spent", "Spent"))
        .column(TableColumn::numeric("points", "Points"))
        .column(TableColumn::new("state", "State"))
        .filter(TableFilter::select(
            "blocked",
            "State",
            vec![
                FilterOption::new("false", "Active"),
                FilterOption::new("true", "Blocked"),
            ],
        ))
        .search_placeholder("Search customers by name, email or phone...")
        .empty_state("No customers found", None)
}

/// Walk-in customers table.
#[must_use]
pub fn offline_customers_table_config() -> DataTableConfig {
    DataTableConfig::new("offline-customers", "/offline-customers")
        .column(TableColumn::new("name", "Customer"))
        .column(TableColumn::new("phone", "Phone"))
        .column(TableColumn::new("email", "Email"))
        .column(TableColumn::new("gstin", "GSTIN"))
        .column(TableColumn::new("actions", ""))
        .search_placeholder("Search by name or phone...")
        .empty_state("No walk-in customers yet", None)
}

/// Coupons table.
#[must_use]
pub fn coupons_table_config() -> DataTableConfig {
    DataTableConfig::new("coupons", "/coupons")
        .column(TableColumn::new("code", "Code"))
        .column(TableColumn::new("discount", "Discount"))
        .column(TableColumn::new("validity", "Valid"))
        .column(TableColumn::numeric("usage", "Used"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select(
            "is_active",
            "Status",
            vec![
                FilterOption::new("true", "Active"),
                FilterOption::new("false", "Inactive"),
            ],
        ))
        .search_placeholder("Search coupon codes...")
        .empty_state("No coupons found", None)
}

/// Reviews moderation table.
#[must_use]
pub fn reviews_table_config() -> DataTableConfig {
    DataTableConfig::new("reviews", "/reviews")
        .column(TableColumn::new("product", "Product"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::new("rating", "Rating"))
        .column(TableColumn::new("comment", "Comment"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select(
            "status",
            "Status",
            status_options(ReviewStatus::ALL, ReviewStatus::as_str, ReviewStatus::label),
        ))
        .filter(TableFilter::select(
            "rating",
            "Rating",
            (1..=5)
                .rev()
                .map(|r| FilterOption::new(&r.to_string(), &format!("{r} star")))
                .collect(),
        ))
        .search_placeholder("Search reviews...")
        .empty_state("No reviews to moderate", None)
}

/// Reward points ledger table.
#[must_use]
pub fn rewards_table_config() -> DataTableConfig {
    DataTableConfig::new("rewards", "/rewards")
        .column(TableColumn::new("date", "Date"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::numeric("points", "Points"))
        .column(TableColumn::new("reason", "Reason"))
        .filter(TableFilter::text("customer_id", "Customer ID", "Customer ID"))
        .search_placeholder("Search by customer or reason...")
        .empty_state("No reward activity", None)
}

/// Offline invoices table.
#[must_use]
pub fn invoices_table_config() -> DataTableConfig {
    DataTableConfig::new("invoices", "/invoices")
        .column(TableColumn::new("number", "Invoice"))
        .column(TableColumn::new("date", "Date"))
        .column(TableColumn::new("customer", "Customer"))
        .column(TableColumn::new("payment", "Payment"))
        .column(TableColumn::numeric("total", "Total"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select(
            "payment_mode",
            "Payment",
            status_options(PaymentMode::ALL, PaymentMode::as_str, PaymentMode::label),
        ))
        .filter(TableFilter::date("from", "From"))
        .filter(TableFilter::date("to", "To"))
        .search_placeholder("Search by invoice number or customer...")
        .empty_state("No invoices yet", Some("Create one for a walk-in sale."))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_with_values_marks_selected_option() {
        let config = orders_table_config()
            .with_values(Some(" AY-1001 "), |key| match key {
                "status" => Some("shipped"),
                "from" => Some("2026-03-01"),
                _ => None,
            });

        assert_eq!(config.search, "AY-1001");
        let status = config.filters.iter().find(|f| f.key == "status").unwrap();
        assert_eq!(status.value, "shipped");
        let selected: Vec<_> = status
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["shipped"]);

        let from = config.filters.iter().find(|f| f.key == "from").unwrap();
        assert!(from.is_date());
        assert_eq!(from.value, "2026-03-01");
    }

    #[test]
    fn test_product_categories_become_options() {
        let categories: Vec<Category> =
            serde_json::from_str(r#"[{"id":"c1","name":"Oils"},{"id":"c2","name":"Teas"}]"#)
                .unwrap();
        let config = products_table_config(&categories);
        let category = &config.filters[0];
        assert!(category.is_select());
        assert_eq!(category.options.len(), 2);
        assert_eq!(category.options[1].label, "Teas");
    }

    #[test]
    fn test_column_count() {
        assert_eq!(categories_table_config().column_count(), 5);
        assert!(!categories_table_config().has_filters);
    }
}
