//! Status enums for various entities.
//!
//! Every enum round-trips through the backend's snake_case wire value and
//! carries the label and badge colour the dashboard renders for it.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown status value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownStatus {
    /// Name of the enum that failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Defines a wire-compatible status enum.
///
/// Each variant is declared as `Variant => ("wire", "Label", "badge-colour")`.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($wire:literal, $label:literal, $badge:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire value used by the backend API.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// CSS badge class for list and detail pages.
            #[must_use]
            pub const fn badge_class(self) -> &'static str {
                match self {
                    $(Self::$variant => $badge,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownStatus {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

status_enum! {
    /// Order lifecycle status. Transitions are validated by the backend.
    pub enum OrderStatus {
        Pending => ("pending", "Pending", "badge-yellow"),
        Confirmed => ("confirmed", "Confirmed", "badge-blue"),
        Processing => ("processing", "Processing", "badge-blue"),
        Shipped => ("shipped", "Shipped", "badge-purple"),
        Delivered => ("delivered", "Delivered", "badge-green"),
        Cancelled => ("cancelled", "Cancelled", "badge-red"),
        Returned => ("returned", "Returned", "badge-gray"),
    }
}

impl OrderStatus {
    /// Whether the order has reached a final state.
    ///
    /// The detail page hides the status form for final orders.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Returned)
    }
}

status_enum! {
    /// Payment status of an online order.
    pub enum PaymentStatus {
        Pending => ("pending", "Pending", "badge-yellow"),
        Paid => ("paid", "Paid", "badge-green"),
        Failed => ("failed", "Failed", "badge-red"),
        Refunded => ("refunded", "Refunded", "badge-gray"),
    }
}

status_enum! {
    /// Catalog visibility of a product.
    pub enum ProductStatus {
        Active => ("active", "Active", "badge-green"),
        Inactive => ("inactive", "Inactive", "badge-gray"),
    }
}

status_enum! {
    /// Moderation state of a product review.
    pub enum ReviewStatus {
        Pending => ("pending", "Pending", "badge-yellow"),
        Approved => ("approved", "Approved", "badge-green"),
        Rejected => ("rejected", "Rejected", "badge-red"),
    }
}

status_enum! {
    /// How a coupon's value is applied.
    pub enum DiscountType {
        Percentage => ("percentage", "Percentage", "badge-blue"),
        Flat => ("flat", "Flat amount", "badge-purple"),
    }
}

status_enum! {
    /// Payment mode recorded on an offline invoice.
    pub enum PaymentMode {
        Cash => ("cash", "Cash", "badge-green"),
        Upi => ("upi", "UPI", "badge-blue"),
        Card => ("card", "Card", "badge-purple"),
    }
}

status_enum! {
    /// GST place-of-supply classification.
    pub enum SupplyType {
        /// Same state as the seller: tax splits into CGST and SGST.
        IntraState => ("intra_state", "Intra-state (CGST + SGST)", "badge-blue"),
        /// Different state: the whole tax is IGST.
        InterState => ("inter_state", "Inter-state (IGST)", "badge-purple"),
    }
}

impl Default for SupplyType {
    fn default() -> Self {
        Self::IntraState
    }
}

status_enum! {
    /// Admin role with different permission levels.
    pub enum AdminRole {
        /// Full access including destructive operations.
        SuperAdmin => ("super_admin", "Super admin", "badge-purple"),
        /// Full access to store management features.
        Admin => ("admin", "Admin", "badge-blue"),
        /// Day-to-day operations; cannot delete records.
        Staff => ("staff", "Staff", "badge-gray"),
    }
}

impl AdminRole {
    /// Whether delete buttons are shown to this role.
    #[must_use]
    pub const fn can_delete(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
        assert_eq!(
            serde_json::to_string(&SupplyType::InterState).unwrap(),
            "\"inter_state\""
        );
        let mode: PaymentMode = serde_json::from_str("\"upi\"").unwrap();
        assert_eq!(mode, PaymentMode::Upi);
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let err = "lost".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "OrderStatus");
        assert_eq!(err.to_string(), "unknown OrderStatus value: \"lost\"");
    }

    #[test]
    fn test_final_order_statuses() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Shipped.is_final());
    }

    #[test]
    fn test_role_permissions() {
        assert!(AdminRole::SuperAdmin.can_delete());
        assert!(!AdminRole::Staff.can_delete());
        assert_eq!(AdminRole::Staff.label(), "Staff");
    }
}
