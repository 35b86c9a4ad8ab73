use crate::clock::Clock;
use crate::config::Config;
use crate::engine::ValidatorEngine;
use crate::ledger::ManualReviewEntry;
use crate::record::{
    ContactQuality, ContactStatus, EmailProvider, RawStudentRecord, ValidatedStudentRecord,
};
use crate::validators::RejectionReason;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    /// Distinct (value, reason) ledger keys
    pub total_rejected: usize,
    pub manual_review_pending: usize,
    pub rejection_reasons: BTreeMap<RejectionReason, u64>,
    pub source_urls_tracked: usize,
    pub skipped_missing_identity: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactQualityStats {
    pub excellent: usize,
    pub good: usize,
    pub email_only: usize,
    pub phone_only: usize,
    pub total_valid: usize,
    pub with_source_url: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: usize,
}

/// Email status breakdown for one declared source tag
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceValidationStats {
    pub total: usize,
    pub verified: usize,
    pub rejected: usize,
    pub missing: usize,
    pub manual: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub accepted: Vec<ValidatedStudentRecord>,
    pub stats: ValidationStats,
    pub manual_review_queue: Vec<ManualReviewEntry>,
    /// Hostnames of accepted records' source URLs
    pub source_domain_stats: BTreeMap<String, usize>,
    pub contact_quality: ContactQualityStats,
    /// Verified email domains, most common first
    pub email_domain_stats: Vec<DomainCount>,
    pub source_validation_stats: BTreeMap<String, SourceValidationStats>,
    pub provider_stats: BTreeMap<EmailProvider, usize>,
}

/// Run `engine` over a whole record set.
///
/// Records without a first and last name never reach the engine. Of the
/// rest, only those with at least one verified contact channel end up in
/// `accepted`. Ledger-derived stats reflect everything the engine has seen,
/// so pass a fresh engine for a self-contained run.
pub fn process_record_set(
    engine: &mut ValidatorEngine,
    records: &[RawStudentRecord],
) -> BatchOutcome {
    let mut skipped_missing_identity = 0;
    let mut validated = Vec::with_capacity(records.len());

    for raw in records {
        if !raw.has_identity() {
            log::debug!("Skipping record {}: missing first or last name", raw.id);
            skipped_missing_identity += 1;
            continue;
        }
        if let Some(record) = engine.validate_student_contact(raw) {
            validated.push(record);
        }
    }

    let source_validation_stats = source_validation_stats(&validated);
    let accepted: Vec<ValidatedStudentRecord> = validated
        .into_iter()
        .filter(|record| record.has_valid_contact)
        .collect();

    let ledger = engine.ledger();
    let stats = ValidationStats {
        total_rejected: ledger.total_rejected(),
        manual_review_pending: ledger.manual_review_queue().len(),
        rejection_reasons: ledger.rejection_reasons(),
        source_urls_tracked: ledger.source_urls_tracked(),
        skipped_missing_identity,
    };

    log::info!(
        "Processed {} records: {} accepted, {} distinct rejections, {} pending manual review",
        records.len(),
        accepted.len(),
        stats.total_rejected,
        stats.manual_review_pending
    );

    BatchOutcome {
        source_domain_stats: source_domain_stats(&accepted),
        contact_quality: contact_quality_stats(&accepted),
        email_domain_stats: email_domain_stats(&accepted),
        provider_stats: provider_stats(&accepted),
        source_validation_stats,
        manual_review_queue: ledger.manual_review_queue().to_vec(),
        stats,
        accepted,
    }
}

/// Fresh engine, one pass, nothing carried over between calls
pub fn run_batch(
    config: &Config,
    clock: Clock,
    records: &[RawStudentRecord],
) -> anyhow::Result<BatchOutcome> {
    let mut engine = ValidatorEngine::new(config.clone())?.with_clock(clock);
    Ok(process_record_set(&mut engine, records))
}

pub fn source_domain_stats(records: &[ValidatedStudentRecord]) -> BTreeMap<String, usize> {
    let mut stats = BTreeMap::new();
    for domain in records.iter().filter_map(|r| r.source_domain.as_ref()) {
        *stats.entry(domain.clone()).or_insert(0) += 1;
    }
    stats
}

pub fn contact_quality_stats(records: &[ValidatedStudentRecord]) -> ContactQualityStats {
    let mut stats = ContactQualityStats {
        total_valid: records.len(),
        ..Default::default()
    };
    for record in records {
        match record.contact_quality {
            ContactQuality::Excellent => stats.excellent += 1,
            ContactQuality::Good => stats.good += 1,
            ContactQuality::Incomplete => {}
        }
        match (
            record.email_status.is_verified(),
            record.phone_status.is_verified(),
        ) {
            (true, false) => stats.email_only += 1,
            (false, true) => stats.phone_only += 1,
            _ => {}
        }
        if record.source_url.is_some() {
            stats.with_source_url += 1;
        }
    }
    stats
}

pub fn email_domain_stats(records: &[ValidatedStudentRecord]) -> Vec<DomainCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for email in records
        .iter()
        .filter(|r| r.email_status.is_verified())
        .filter_map(|r| r.email.as_deref())
    {
        if let Some((_, domain)) = email.split_once('@') {
            *counts.entry(domain).or_insert(0) += 1;
        }
    }

    let mut stats: Vec<DomainCount> = counts
        .into_iter()
        .map(|(domain, count)| DomainCount {
            domain: domain.to_string(),
            count,
        })
        .collect();
    // stable: equal counts stay alphabetical
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

pub fn source_validation_stats(
    records: &[ValidatedStudentRecord],
) -> BTreeMap<String, SourceValidationStats> {
    let mut stats: BTreeMap<String, SourceValidationStats> = BTreeMap::new();
    for record in records {
        let source = record.source.as_deref().unwrap_or("unknown").to_string();
        let entry = stats.entry(source).or_default();
        entry.total += 1;
        match record.email_status {
            ContactStatus::Verified => entry.verified += 1,
            ContactStatus::Rejected => entry.rejected += 1,
            ContactStatus::Missing => entry.missing += 1,
            ContactStatus::ManualVerificationNeeded => entry.manual += 1,
        }
    }
    stats
}

pub fn provider_stats(records: &[ValidatedStudentRecord]) -> BTreeMap<EmailProvider, usize> {
    let mut stats = BTreeMap::new();
    for provider in records.iter().filter_map(|r| r.email_provider) {
        *stats.entry(provider).or_insert(0) += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    fn raw(
        id: u32,
        name: (&str, &str),
        email: Option<&str>,
        phone: Option<&str>,
        source_url: Option<&str>,
    ) -> RawStudentRecord {
        RawStudentRecord {
            id,
            first_name: name.0.to_string(),
            last_name: name.1.to_string(),
            country: "Sénégal".to_string(),
            city: "Dakar".to_string(),
            domain: "Finance".to_string(),
            specialization: "Analyste Financier".to_string(),
            level: "Master".to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            source: Some("linkedin_public".to_string()),
            source_url: source_url.map(str::to_string),
            ..Default::default()
        }
    }

    fn sample() -> Vec<RawStudentRecord> {
        vec![
            raw(
                1,
                ("Awa", "Diop"),
                Some("awa.diop@gmail.com"),
                Some("+221771234567"),
                Some("https://linkedin.com/in/awa"),
            ),
            raw(
                2,
                ("Omar", "Sy"),
                Some("omar.sy@yahoo.fr"),
                None,
                Some("https://linkedin.com/in/omar"),
            ),
            raw(
                3,
                ("Ines", "Kone"),
                Some("info@gmail.com"),
                Some("+225 07 12 34 56 78"),
                Some("https://forum.etudiant.ci/u/ines"),
            ),
            raw(
                4,
                ("Yao", "Mensah"),
                Some("yao.mensah@gmail.com"),
                None,
                None,
            ),
            raw(5, ("Fatou", "Ba"), None, None, Some("https://annuaire.sn/fatou")),
            raw(
                6,
                ("", "Nameless"),
                Some("nameless@gmail.com"),
                None,
                Some("https://linkedin.com/in/n"),
            ),
            raw(
                7,
                ("Koffi", "Adjo"),
                Some("test@example.com"),
                Some("+1555123456"),
                Some("https://linkedin.com/in/koffi"),
            ),
        ]
    }

    #[test]
    fn test_batch_partitions_records() {
        let outcome = run_batch(&Config::default(), fixed_clock(), &sample()).unwrap();

        let ids: Vec<u32> = outcome.accepted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(outcome.stats.skipped_missing_identity, 1);

        // Fatou (no contact) and Koffi (everything rejected)
        let review: Vec<u32> = outcome
            .manual_review_queue
            .iter()
            .map(|e| e.student_id)
            .collect();
        assert_eq!(review, vec![5, 7]);
        assert_eq!(outcome.stats.manual_review_pending, 2);

        let reasons = &outcome.stats.rejection_reasons;
        assert_eq!(reasons[&RejectionReason::GenericPattern], 1);
        assert_eq!(reasons[&RejectionReason::SourceUrlMissing], 1);
        assert_eq!(reasons[&RejectionReason::ForbiddenDomain], 1);
        assert_eq!(reasons[&RejectionReason::InvalidPhoneFormat], 1);
        assert_eq!(outcome.stats.total_rejected, 4);
        assert_eq!(outcome.stats.source_urls_tracked, 2);

        assert_eq!(outcome.source_domain_stats["linkedin.com"], 2);
        assert_eq!(outcome.source_domain_stats["forum.etudiant.ci"], 1);
    }

    #[test]
    fn test_accepted_records_hold_invariants() {
        let outcome = run_batch(&Config::default(), fixed_clock(), &sample()).unwrap();
        for record in &outcome.accepted {
            let email = record.email_status.is_verified();
            let phone = record.phone_status.is_verified();
            assert_eq!(record.has_valid_contact, email || phone);
            match record.contact_quality {
                ContactQuality::Excellent => assert!(email && phone),
                ContactQuality::Good => assert!(email ^ phone),
                ContactQuality::Incomplete => panic!("incomplete record accepted"),
            }
            assert_eq!(record.email.is_some(), email);
            assert_eq!(record.phone.is_some(), phone);
            assert!(record.source_url.is_some());
        }
    }

    #[test]
    fn test_batch_is_idempotent_with_fresh_engine() {
        let records = sample();
        let first = run_batch(&Config::default(), fixed_clock(), &records).unwrap();
        let second = run_batch(&Config::default(), fixed_clock(), &records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reused_engine_accumulates_ledger() {
        let records = sample();
        let mut engine = ValidatorEngine::new(Config::default())
            .unwrap()
            .with_clock(fixed_clock());
        let first = process_record_set(&mut engine, &records);
        let second = process_record_set(&mut engine, &records);

        assert_eq!(first.accepted, second.accepted);
        assert_eq!(first.stats.total_rejected, second.stats.total_rejected);
        assert_eq!(
            second.stats.rejection_reasons[&RejectionReason::GenericPattern],
            2
        );
        assert_eq!(second.manual_review_queue.len(), 4);
    }

    #[test]
    fn test_no_contact_record_in_review_exactly_once() {
        let outcome = run_batch(&Config::default(), fixed_clock(), &sample()).unwrap();
        assert!(outcome.accepted.iter().all(|r| r.id != 5));
        assert_eq!(
            outcome
                .manual_review_queue
                .iter()
                .filter(|e| e.student_id == 5)
                .count(),
            1
        );
    }

    #[test]
    fn test_lenient_policy_keeps_unsourced_records() {
        let mut config = Config::default();
        config.policy.require_source_url = false;
        let outcome = run_batch(&config, fixed_clock(), &sample()).unwrap();

        let ids: Vec<u32> = outcome.accepted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(outcome.contact_quality.with_source_url, 3);
    }

    #[test]
    fn test_dashboard_aggregates() {
        let outcome = run_batch(&Config::default(), fixed_clock(), &sample()).unwrap();

        assert_eq!(
            outcome.contact_quality,
            ContactQualityStats {
                excellent: 1,
                good: 2,
                email_only: 1,
                phone_only: 1,
                total_valid: 3,
                with_source_url: 3,
            }
        );
        assert_eq!(
            outcome.email_domain_stats,
            vec![
                DomainCount {
                    domain: "gmail.com".to_string(),
                    count: 1
                },
                DomainCount {
                    domain: "yahoo.fr".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(outcome.provider_stats[&EmailProvider::Gmail], 1);
        assert_eq!(outcome.provider_stats[&EmailProvider::Yahoo], 1);

        let linkedin = &outcome.source_validation_stats["linkedin_public"];
        // Yao was dropped at the source URL gate and never validated
        assert_eq!(linkedin.total, 5);
        assert_eq!(linkedin.verified, 2);
        assert_eq!(linkedin.rejected, 2);
        assert_eq!(linkedin.missing, 1);
    }
}
