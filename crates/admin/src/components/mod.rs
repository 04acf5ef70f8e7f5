//! Reusable page components for admin templates.

pub mod chart;
pub mod data_table;
pub mod pagination;

pub use chart::{Bar, BarChart};
pub use data_table::{DataTableConfig, FilterOption, FilterType, TableColumn, TableFilter};
pub use pagination::{PageLink, Pagination};
