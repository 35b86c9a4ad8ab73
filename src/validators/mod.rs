pub mod denylist;
pub mod email;
pub mod phone;
pub mod source_url;

pub use denylist::Denylist;
pub use email::{EmailValidator, ValidEmail};
pub use phone::{PhoneValidator, ValidPhone};
pub use source_url::{SourceUrlValidator, ValidSourceUrl};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a contact value, or a whole record, was not accepted.
///
/// These are data, not errors: every one of them ends up as a status on
/// the record and a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    Missing,
    InvalidFormat,
    ForbiddenDomain,
    GenericPattern,
    ManuallyBlacklisted,
    UnauthorizedSource,
    InvalidPhoneFormat,
    SourceUrlMissing,
    InvalidUrlFormat,
    InvalidProtocol,
    NoValidContactInfo,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Missing => "MISSING",
            RejectionReason::InvalidFormat => "INVALID_FORMAT",
            RejectionReason::ForbiddenDomain => "FORBIDDEN_DOMAIN",
            RejectionReason::GenericPattern => "GENERIC_PATTERN",
            RejectionReason::ManuallyBlacklisted => "MANUALLY_BLACKLISTED",
            RejectionReason::UnauthorizedSource => "UNAUTHORIZED_SOURCE",
            RejectionReason::InvalidPhoneFormat => "INVALID_PHONE_FORMAT",
            RejectionReason::SourceUrlMissing => "SOURCE_URL_MISSING",
            RejectionReason::InvalidUrlFormat => "INVALID_URL_FORMAT",
            RejectionReason::InvalidProtocol => "INVALID_PROTOCOL",
            RejectionReason::NoValidContactInfo => "NO_VALID_CONTACT_INFO",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single-field check
pub type Verdict<T> = Result<T, RejectionReason>;

/// Treat absent and whitespace-only values the same way
pub(crate) fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display_matches_serde() {
        for reason in [
            RejectionReason::ForbiddenDomain,
            RejectionReason::SourceUrlMissing,
            RejectionReason::NoValidContactInfo,
        ] {
            assert_eq!(
                serde_json::to_string(&reason).unwrap(),
                format!("\"{reason}\"")
            );
        }
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  a ")), Some("a"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
