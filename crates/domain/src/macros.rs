//! Macro for implementing Display and FromStr for name-like enums
//!
//! Providers and resource kinds are persisted and parsed from the command
//! line by their lowercase names. This macro keeps both directions in one
//! table so they cannot drift apart.
//!
//! # Example
//!
//! ```rust
//! use dulynoted_domain::impl_domain_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Draft,
//!     Issue,
//! }
//!
//! impl_domain_name_conversions!(Channel {
//!     Draft => "draft",
//!     Issue => "issue",
//! });
//!
//! assert_eq!(Channel::Issue.to_string(), "issue");
//! assert_eq!("DRAFT".parse::<Channel>(), Ok(Channel::Draft));
//! ```

/// Implements Display and FromStr for enums with a fixed lowercase name per
/// variant
///
/// Parsing is case-insensitive; display always produces the lowercase name.
#[macro_export]
macro_rules! impl_domain_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Lowercase name of the variant
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
