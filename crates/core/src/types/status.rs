//! Status enums for various entities.
//!
//! The backend is loose about casing and spelling ("To Receive",
//! "to-receive", "canceled"). Every status here goes through one
//! normalization boundary in [`FromStr`](std::str::FromStr), which serde
//! deserialization also uses. Unknown values are an error, not a fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A status string that matches no known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} status: {value:?}")]
pub struct StatusError {
    /// Which status family was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl StatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Deserialize a status field where an explicit `null` means the default.
///
/// Unknown strings are still rejected.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lowercase, trim and fold `-`/`_` into spaces.
fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderStatus {
    /// Placed and awaiting pickup or delivery. The backend's "pending".
    #[default]
    ToReceive,
    /// Handed over to the buyer.
    Received,
    /// Cancelled by staff.
    Cancelled,
}

impl OrderStatus {
    /// All statuses in the order the admin dropdown lists them.
    pub const ALL: [Self; 3] = [Self::ToReceive, Self::Received, Self::Cancelled];

    /// Canonical wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToReceive => "to receive",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }

    /// Title-cased label for tables and CSV.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ToReceive => "To Receive",
            Self::Received => "Received",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Value used in form fields and CLI arguments.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ToReceive => "to-receive",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "to receive" | "pending" => Ok(Self::ToReceive),
            "received" => Ok(Self::Received),
            "cancelled" | "canceled" | "cancel" => Ok(Self::Cancelled),
            _ => Err(StatusError::new("order", s)),
        }
    }
}

/// Payment status of an order. Missing on the wire means `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// All statuses in dropdown order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Paid, Self::Failed];

    /// Canonical wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }

    /// Title-cased label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            _ => Err(StatusError::new("payment", s)),
        }
    }
}

/// Beneficiary enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BeneficiaryStatus {
    #[default]
    Active,
    Inactive,
    Pending,
    OnHold,
}

impl BeneficiaryStatus {
    /// Statuses offered when adding or editing a beneficiary.
    pub const ALL: [Self; 4] = [Self::Active, Self::Inactive, Self::Pending, Self::OnHold];

    /// Canonical wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::OnHold => "on hold",
        }
    }

    /// The quick toggle flips `active` to `on hold`; anything else becomes active.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::OnHold,
            Self::Inactive | Self::Pending | Self::OnHold => Self::Active,
        }
    }
}

impl FromStr for BeneficiaryStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            "on hold" | "onhold" => Ok(Self::OnHold),
            _ => Err(StatusError::new("beneficiary", s)),
        }
    }
}

/// Staff account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
}

impl StaffStatus {
    /// Canonical wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl FromStr for StaffStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(StatusError::new("staff", s)),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = StatusError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }

            impl From<$ty> for String {
                fn from(status: $ty) -> Self {
                    status.as_str().to_owned()
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

string_conversions!(OrderStatus, PaymentStatus, BeneficiaryStatus, StaffStatus);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_accepts_observed_variants() {
        let cases = [
            ("to receive", OrderStatus::ToReceive),
            ("To Receive", OrderStatus::ToReceive),
            ("to-receive", OrderStatus::ToReceive),
            ("pending", OrderStatus::ToReceive),
            ("Pending", OrderStatus::ToReceive),
            ("received", OrderStatus::Received),
            ("Received", OrderStatus::Received),
            ("cancelled", OrderStatus::Cancelled),
            ("Cancelled", OrderStatus::Cancelled),
            ("canceled", OrderStatus::Cancelled),
            ("cancel", OrderStatus::Cancelled),
        ];
        for (raw, expected) in cases {
            assert_eq!(raw.parse::<OrderStatus>().unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "order");
        assert!(serde_json::from_str::<OrderStatus>("\"refunded\"").is_err());
    }

    #[test]
    fn test_order_status_serializes_canonical() {
        let status: OrderStatus = serde_json::from_str("\"To Receive\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"to receive\"");
    }

    #[test]
    fn test_payment_status() {
        assert_eq!("PAID".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert!("refunded".parse::<PaymentStatus>().is_err());
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_beneficiary_toggle() {
        assert_eq!(BeneficiaryStatus::Active.toggled(), BeneficiaryStatus::OnHold);
        assert_eq!(BeneficiaryStatus::OnHold.toggled(), BeneficiaryStatus::Active);
        assert_eq!(BeneficiaryStatus::Pending.toggled(), BeneficiaryStatus::Active);
        assert_eq!(
            "on hold".parse::<BeneficiaryStatus>().unwrap(),
            BeneficiaryStatus::OnHold
        );
    }

    #[test]
    fn test_staff_toggle() {
        assert_eq!(StaffStatus::Active.toggled(), StaffStatus::Inactive);
        assert_eq!(StaffStatus::Inactive.toggled(), StaffStatus::Active);
    }
}
