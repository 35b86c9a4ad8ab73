use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::{ManualReviewEntry, RejectionLedger};
use crate::record::{ContactQuality, ContactStatus, RawStudentRecord, ValidatedStudentRecord};
use crate::sources::SourceRegistry;
use crate::validators::{
    EmailValidator, PhoneValidator, RejectionReason, SourceUrlValidator, ValidEmail, ValidPhone,
    ValidSourceUrl, Verdict,
};

/// Per-record contact validation.
///
/// Owns its compiled rule tables and its ledger; build one per batch run
/// (or per test) rather than sharing one across runs.
pub struct ValidatorEngine {
    config: Config,
    email: EmailValidator,
    phone: PhoneValidator,
    source_url: SourceUrlValidator,
    sources: SourceRegistry,
    ledger: RejectionLedger,
    clock: Clock,
}

impl ValidatorEngine {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let engine = ValidatorEngine {
            email: EmailValidator::new(&config.email)?,
            phone: PhoneValidator::new(&config.phone)?,
            source_url: SourceUrlValidator::new()?,
            sources: SourceRegistry::from_rules(&config.sources),
            ledger: RejectionLedger::new(),
            clock: Clock::System,
            config,
        };

        log::debug!(
            "Validator engine ready: {} forbidden domains, {} generic patterns, {} authorized sources, source URL {}",
            engine.email.denylist().forbidden_domain_count(),
            engine.email.denylist().pattern_count(),
            engine.sources.tags().len(),
            if engine.config.policy.require_source_url {
                "required"
            } else {
                "optional"
            }
        );
        Ok(engine)
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &RejectionLedger {
        &self.ledger
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Add an address to the manual blacklist
    pub fn blacklist_email(&mut self, address: &str, reason: &str) {
        if self.email.blacklist(address) {
            log::info!("Blacklisted {}: {reason}", address.trim().to_lowercase());
        }
    }

    /// Email format, denylist and source authorization, without touching
    /// the ledger
    pub fn check_email(&self, raw: &str, source: Option<&str>) -> Verdict<ValidEmail> {
        let email = self.email.validate(Some(raw))?;
        self.check_source(source)?;
        Ok(email)
    }

    pub fn check_phone(&self, raw: &str) -> Verdict<ValidPhone> {
        self.phone.validate(Some(raw))
    }

    pub fn check_source_url(&self, raw: &str) -> Verdict<ValidSourceUrl> {
        self.source_url.validate(Some(raw))
    }

    fn check_source(&self, source: Option<&str>) -> Verdict<()> {
        match source.map(str::trim).filter(|tag| !tag.is_empty()) {
            Some(tag) if self.sources.is_authorized(tag) => Ok(()),
            Some(_) => Err(RejectionReason::UnauthorizedSource),
            None if self.config.policy.allow_undeclared_source => Ok(()),
            None => Err(RejectionReason::UnauthorizedSource),
        }
    }

    /// Validate one record.
    ///
    /// Returns `None` only when the record is dropped by the source URL
    /// gate; every other failure is reported through the record's status
    /// fields and the ledger.
    pub fn validate_student_contact(
        &mut self,
        raw: &RawStudentRecord,
    ) -> Option<ValidatedStudentRecord> {
        let now = self.clock.now();
        let source = raw.source.as_deref();
        let mut record = ValidatedStudentRecord::skeleton(raw, now);

        // Provenance is checked before any contact field
        match self.source_url.validate(raw.source_url.as_deref()) {
            Ok(valid) => {
                record.source_url = Some(valid.url);
                record.source_domain = Some(valid.domain);
            }
            Err(reason) => {
                self.ledger.log_rejection(
                    &raw.display_name(),
                    reason,
                    source,
                    raw.source_url.as_deref(),
                    now,
                );
                if self.config.policy.require_source_url {
                    log::debug!(
                        "Dropping student {} ({}): {reason}",
                        raw.id,
                        raw.display_name()
                    );
                    return None;
                }
            }
        }

        let email_verdict = self
            .email
            .validate(raw.email.as_deref())
            .and_then(|email| self.check_source(source).map(|()| email));
        match email_verdict {
            Ok(email) => {
                if let Some(url) = &record.source_url {
                    self.ledger.trace_source(&email.address, url);
                    record.email_source_url = Some(url.clone());
                }
                record.email_status = ContactStatus::Verified;
                record.email_provider = Some(email.provider);
                record.email_verified_at = Some(now);
                record.email = Some(email.address);
            }
            Err(RejectionReason::Missing) => {}
            Err(reason) => {
                let value = raw.email.as_deref().unwrap_or_default().to_lowercase();
                self.ledger.log_rejection(
                    &value,
                    reason,
                    source,
                    record.source_url.as_deref(),
                    now,
                );
                record.email_status = if self.config.policy.flag_rejected_for_review {
                    ContactStatus::ManualVerificationNeeded
                } else {
                    ContactStatus::Rejected
                };
                record.email_rejection_reason = Some(reason);
            }
        }

        match self.phone.validate(raw.phone.as_deref()) {
            Ok(phone) => {
                record.phone_status = ContactStatus::Verified;
                record.phone = Some(phone.number);
                record.phone_country_code = phone.calling_code;
            }
            Err(RejectionReason::Missing) => {}
            Err(reason) => {
                self.ledger.log_rejection(
                    raw.phone.as_deref().unwrap_or_default(),
                    reason,
                    None,
                    record.source_url.as_deref(),
                    now,
                );
                record.phone_status = ContactStatus::Rejected;
                record.phone_rejection_reason = Some(reason);
            }
        }

        record.contact_quality = ContactQuality::from_channels(
            record.email_status.is_verified(),
            record.phone_status.is_verified(),
        );
        record.has_valid_contact = record.contact_quality.is_usable();

        if !record.has_valid_contact {
            self.ledger.queue_for_review(ManualReviewEntry {
                student_id: record.id,
                name: record.display_name(),
                country: record.country.clone(),
                domain: record.domain.clone(),
                source_url: record.source_url.clone(),
                reason: RejectionReason::NoValidContactInfo,
                added_at: now,
            });
        }

        Some(record)
    }
}
