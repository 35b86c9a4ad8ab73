use crate::domain_utils::DomainUtils;
use crate::validators::RejectionReason;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionEntry {
    pub value: String,
    pub reason: RejectionReason,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub count: u64,
    pub first_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualReviewEntry {
    pub student_id: u32,
    pub name: String,
    pub country: String,
    pub domain: String,
    pub source_url: Option<String>,
    pub reason: RejectionReason,
    pub added_at: DateTime<Utc>,
}

/// Audit trail of one engine: rejected values, the source URL behind every
/// verified email, and records nobody can be contacted through.
///
/// Everything here only grows for the lifetime of the engine.
#[derive(Debug, Clone, Default)]
pub struct RejectionLedger {
    rejections: BTreeMap<(String, RejectionReason), RejectionEntry>,
    traced_sources: BTreeMap<String, String>,
    manual_review: Vec<ManualReviewEntry>,
}

impl RejectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more rejection of `value` for `reason`. Source details are
    /// kept from the first sighting.
    pub fn log_rejection(
        &mut self,
        value: &str,
        reason: RejectionReason,
        source: Option<&str>,
        source_url: Option<&str>,
        at: DateTime<Utc>,
    ) {
        let value = value.trim().to_string();
        log::debug!("Rejected '{value}': {reason}");

        self.rejections
            .entry((value.clone(), reason))
            .and_modify(|entry| entry.count += 1)
            .or_insert_with(|| RejectionEntry {
                value,
                reason,
                source: source.map(str::to_string),
                source_url: source_url.map(str::to_string),
                count: 1,
                first_seen_at: at,
            });
    }

    /// Remember where a verified contact value was found
    pub fn trace_source(&mut self, contact: &str, source_url: &str) {
        self.traced_sources
            .insert(contact.to_string(), source_url.to_string());
    }

    pub fn queue_for_review(&mut self, entry: ManualReviewEntry) {
        log::debug!(
            "Queued student {} ({}) for manual review: {}",
            entry.student_id,
            entry.name,
            entry.reason
        );
        self.manual_review.push(entry);
    }

    /// Distinct (value, reason) keys
    pub fn total_rejected(&self) -> usize {
        self.rejections.len()
    }

    /// Reason -> summed count across all values
    pub fn rejection_reasons(&self) -> BTreeMap<RejectionReason, u64> {
        let mut reasons = BTreeMap::new();
        for entry in self.rejections.values() {
            *reasons.entry(entry.reason).or_insert(0) += entry.count;
        }
        reasons
    }

    pub fn source_urls_tracked(&self) -> usize {
        self.traced_sources.len()
    }

    /// Hostname histogram over traced source URLs
    pub fn source_domain_stats(&self) -> BTreeMap<String, usize> {
        let mut stats = BTreeMap::new();
        for url in self.traced_sources.values() {
            if let Some(host) = DomainUtils::url_host(url) {
                *stats.entry(host).or_insert(0) += 1;
            }
        }
        stats
    }

    pub fn entries(&self) -> impl Iterator<Item = &RejectionEntry> {
        self.rejections.values()
    }

    pub fn entry(&self, value: &str, reason: RejectionReason) -> Option<&RejectionEntry> {
        self.rejections.get(&(value.to_string(), reason))
    }

    pub fn manual_review_queue(&self) -> &[ManualReviewEntry] {
        &self.manual_review
    }
}
