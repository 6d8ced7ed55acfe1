//! Domain vocabulary shared by the persistence, service and HTTP layers.
//!
//! Entities store these values as plain strings; the enums here are the
//! typed view with a single canonical spelling for each variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted string is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a fieldless enum whose variants map one-to-one onto snake_case
/// strings, with `as_str`, `ALL`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Role carried in session tokens.
    Role ("role") {
        Customer => "customer",
        Seller => "seller",
        Admin => "admin",
    }
}

string_enum! {
    /// Which account population a one-time code or registration belongs to.
    /// Keeps a customer code from being replayed against the seller flow.
    ActorKind ("actor kind") {
        Customer => "customer",
        Seller => "seller",
    }
}

string_enum! {
    /// Why a one-time code was issued. Doubles as the notification template.
    OtpPurpose ("otp purpose") {
        EmailVerification => "email_verification",
        PasswordReset => "password_reset",
        SellerAdminApproval => "seller_admin_approval",
        ProductCreationApproval => "product_creation_approval",
    }
}

string_enum! {
    /// Lifecycle of a provisional registration.
    ///
    /// Customers go `Unverified -> Active`; sellers walk every step.
    RegistrationStatus ("registration status") {
        Unverified => "unverified",
        EmailVerified => "email_verified",
        AdminApproved => "admin_approved",
        Active => "active",
    }
}

string_enum! {
    Gender ("gender") {
        Male => "male",
        Female => "female",
        Other => "other",
    }
}

string_enum! {
    /// Audience a product is made for.
    ProductSex ("product sex") {
        Male => "male",
        Female => "female",
        Both => "both",
    }
}

string_enum! {
    ProductType ("product type") {
        Electronics => "electronics",
        Clothing => "clothing",
        BasicNeeds => "basic_needs",
        Furniture => "furniture",
        Books => "books",
        Toys => "toys",
        Sports => "sports",
        Beauty => "beauty",
        Other => "other",
    }
}

string_enum! {
    OrderStatus ("order status") {
        Pending => "pending",
        Confirmed => "confirmed",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
        Returned => "returned",
    }
}

impl ActorKind {
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Customer => Role::Customer,
            Self::Seller => Role::Seller,
        }
    }
}

impl RegistrationStatus {
    /// Status a registration must be in before the code for `purpose` may be
    /// redeemed against it.
    #[must_use]
    pub const fn required_for(purpose: OtpPurpose) -> Option<Self> {
        match purpose {
            OtpPurpose::EmailVerification => Some(Self::Unverified),
            OtpPurpose::SellerAdminApproval => Some(Self::EmailVerified),
            OtpPurpose::PasswordReset | OtpPurpose::ProductCreationApproval => None,
        }
    }
}

impl OrderStatus {
    /// Orders may only be cancelled before they enter fulfilment.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Final statuses; an order that reaches one never changes again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Delivered | Self::Returned)
    }

    /// Statuses counted towards revenue on the admin dashboard.
    pub const REVENUE: &'static [Self] = &[Self::Shipped, Self::Delivered];
}

/// Lower-cases and trims an email so lookups are case-insensitive.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_strings() {
        for purpose in OtpPurpose::ALL {
            assert_eq!(purpose.as_str().parse::<OtpPurpose>().unwrap(), *purpose);
        }
        assert_eq!("basic_needs".parse::<ProductType>(), Ok(ProductType::BasicNeeds));
    }

    #[test]
    fn test_unknown_variant() {
        let err = "x".parse::<Gender>().unwrap_err();
        assert_eq!(err.to_string(), "'x' is not a valid gender");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OtpPurpose::SellerAdminApproval).unwrap();
        assert_eq!(json, "\"seller_admin_approval\"");
    }

    #[test]
    fn test_cancellable_statuses() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Returned.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_required_status() {
        assert_eq!(
            RegistrationStatus::required_for(OtpPurpose::SellerAdminApproval),
            Some(RegistrationStatus::EmailVerified)
        );
        assert_eq!(
            RegistrationStatus::required_for(OtpPurpose::PasswordReset),
            None
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  New@X.com "), "new@x.com");
    }
}
