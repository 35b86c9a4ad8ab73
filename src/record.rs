use crate::validators::RejectionReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A student profile as it arrives from the static data modules.
///
/// Nothing here has been checked. Identity strings default to empty so a
/// record with a missing name still deserializes and can be filtered out by
/// the batch processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStudentRecord {
    pub id: u32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub resident_in_morocco: bool,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl RawStudentRecord {
    /// "First Last", the key used when a whole record is rejected
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_identity(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    Verified,
    Rejected,
    Missing,
    ManualVerificationNeeded,
}

impl ContactStatus {
    pub fn is_verified(self) -> bool {
        self == ContactStatus::Verified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactQuality {
    /// Email and phone both verified
    Excellent,
    /// Exactly one channel verified
    Good,
    Incomplete,
}

impl ContactQuality {
    pub fn from_channels(email_verified: bool, phone_verified: bool) -> Self {
        match (email_verified, phone_verified) {
            (true, true) => ContactQuality::Excellent,
            (true, false) | (false, true) => ContactQuality::Good,
            (false, false) => ContactQuality::Incomplete,
        }
    }

    pub fn is_usable(self) -> bool {
        self != ContactQuality::Incomplete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Gmail,
    Yahoo,
    Outlook,
    Educational,
    Other,
}

impl EmailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Gmail => "gmail",
            EmailProvider::Yahoo => "yahoo",
            EmailProvider::Outlook => "outlook",
            EmailProvider::Educational => "educational",
            EmailProvider::Other => "other",
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the engine for one record. Built once per run and never
/// mutated afterwards; contact values only appear here once they passed
/// every gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedStudentRecord {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub city: String,
    pub resident_in_morocco: bool,
    pub domain: String,
    pub specialization: String,
    pub level: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub source_domain: Option<String>,

    pub email_status: ContactStatus,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_provider: Option<EmailProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_rejection_reason: Option<RejectionReason>,

    pub phone_status: ContactStatus,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_rejection_reason: Option<RejectionReason>,

    pub contact_quality: ContactQuality,
    pub has_valid_contact: bool,
    pub extracted_at: DateTime<Utc>,
}

impl ValidatedStudentRecord {
    /// Copies identity and academic fields; every contact field starts out
    /// MISSING until the engine fills it in.
    pub fn skeleton(raw: &RawStudentRecord, extracted_at: DateTime<Utc>) -> Self {
        Self {
            id: raw.id,
            first_name: raw.first_name.clone(),
            last_name: raw.last_name.clone(),
            country: raw.country.clone(),
            city: raw.city.clone(),
            resident_in_morocco: raw.resident_in_morocco,
            domain: raw.domain.clone(),
            specialization: raw.specialization.clone(),
            level: raw.level.clone(),
            bio: raw.bio.clone(),
            photo: raw.photo.clone(),
            source: raw.source.clone(),
            source_url: None,
            source_domain: None,
            email_status: ContactStatus::Missing,
            email: None,
            email_provider: None,
            email_verified_at: None,
            email_source_url: None,
            email_rejection_reason: None,
            phone_status: ContactStatus::Missing,
            phone: None,
            phone_country_code: None,
            phone_rejection_reason: None,
            contact_quality: ContactQuality::Incomplete,
            has_valid_contact: false,
            extracted_at,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
