use serde::{Deserialize, Serialize};

/// Error for parsing an enum from its string form.
#[derive(Debug, thiserror::Error)]
#[error("invalid {field} value: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    Severe => "severe",
});

impl Severity {
    /// Uppercase banner form used in reply headers.
    pub fn banner(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::Severe => "SEVERE",
        }
    }
}

str_enum!(MessageRole {
    Patient => "patient",
    Triagecare => "triagecare",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_round_trip() {
        for (variant, s) in [
            (Severity::Low, "low"),
            (Severity::Medium, "medium"),
            (Severity::Severe, "severe"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Severity::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn severity_banner_is_uppercase() {
        assert_eq!(Severity::Low.banner(), "LOW");
        assert_eq!(Severity::Medium.banner(), "MEDIUM");
        assert_eq!(Severity::Severe.banner(), "SEVERE");
    }

    #[test]
    fn message_role_round_trip() {
        for (variant, s) in [
            (MessageRole::Patient, "patient"),
            (MessageRole::Triagecare, "triagecare"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(MessageRole::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Severity::from_str("critical").is_err());
        assert!(MessageRole::from_str("").is_err());
    }
}
