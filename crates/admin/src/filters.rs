//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the crate version, appended to static asset URLs so a deploy
/// invalidates cached CSS and JS.
///
/// Usage in templates: `{{ ""|asset_version }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn asset_version(
    _value: impl Display,
    _env: &dyn askama::Values,
) -> askama::Result<&'static str> {
    Ok(env!("CARGO_PKG_VERSION"))
}

/// Renders an empty value as an em dash placeholder.
///
/// Usage in templates: `{{ customer.gstin|or_dash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn or_dash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(if text.trim().is_empty() {
        "\u{2014}".to_string()
    } else {
        text
    })
}
