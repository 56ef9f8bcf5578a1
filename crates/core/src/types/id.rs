//! Newtype IDs for type-safe entity references.
//!
//! The backend keys every document with an opaque string (`_id`). Use the
//! `define_id!` macro to create wrappers that keep an order id from being
//! passed where a product id is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use segunda_mana_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::new("64f0c2");
/// assert_eq!(shelf.as_str(), "64f0c2");
///
/// // These are different types, so this won't compile:
/// // let _: BinId = shelf;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Backend document IDs
define_id!(ProductId);
define_id!(InventoryId);
define_id!(OrderId);
define_id!(AnnouncementId);
define_id!(BeneficiaryId);
define_id!(StaffId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_serde() {
        let id: OrderId = serde_json::from_str("\"65a1f0\"").unwrap();
        assert_eq!(id.as_str(), "65a1f0");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"65a1f0\"");
    }

    #[test]
    fn test_display_and_conversions() {
        let id = ProductId::from("abc");
        assert_eq!(id.to_string(), "abc");
        let raw: String = id.into();
        assert_eq!(raw, "abc");
    }
}
