use super::RejectionReason;
use crate::config::EmailRules;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Forbidden domains, generic/auto-generated address patterns and the
/// operator-managed blacklist, compiled once.
#[derive(Debug, Clone)]
pub struct Denylist {
    forbidden_domains: HashSet<String>,
    generic_patterns: Vec<Regex>,
    blacklisted: HashSet<String>,
}

impl Denylist {
    pub fn from_rules(rules: &EmailRules) -> anyhow::Result<Self> {
        let generic_patterns = rules
            .generic_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| anyhow::anyhow!("Invalid regex pattern '{}': {}", pattern, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            forbidden_domains: rules
                .forbidden_domains
                .iter()
                .map(|domain| domain.trim().to_lowercase())
                .collect(),
            generic_patterns,
            blacklisted: rules
                .blacklisted_addresses
                .iter()
                .map(|address| address.trim().to_lowercase())
                .collect(),
        })
    }

    /// First denylist hit for a normalized address, in check order:
    /// forbidden domain, generic pattern, manual blacklist
    pub fn check(&self, address: &str, domain: &str) -> Option<RejectionReason> {
        if self.forbidden_domains.contains(domain) {
            return Some(RejectionReason::ForbiddenDomain);
        }

        if self
            .generic_patterns
            .iter()
            .any(|pattern| pattern.is_match(address))
        {
            return Some(RejectionReason::GenericPattern);
        }

        if self.blacklisted.contains(address) {
            return Some(RejectionReason::ManuallyBlacklisted);
        }

        None
    }

    /// Returns false if the address was already blacklisted
    pub fn blacklist(&mut self, address: &str) -> bool {
        self.blacklisted.insert(address.trim().to_lowercase())
    }

    pub fn pattern_count(&self) -> usize {
        self.generic_patterns.len()
    }

    pub fn forbidden_domain_count(&self) -> usize {
        self.forbidden_domains.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denylist() -> Denylist {
        Denylist::from_rules(&EmailRules::default()).unwrap()
    }

    #[test]
    fn test_forbidden_domain_wins_over_pattern() {
        // test@ also matches a generic pattern; the domain is checked first
        assert_eq!(
            denylist().check("test@example.com", "example.com"),
            Some(RejectionReason::ForbiddenDomain)
        );
    }

    #[test]
    fn test_generic_patterns() {
        let denylist = denylist();
        for address in [
            "info@gmail.com",
            "no-reply@yahoo.fr",
            "user42@gmail.com",
            "test7@outlook.com",
            "etudiant12@gmail.com",
            "prenom.nom@gmail.com",
            "FirstName.LastName@gmail.com",
        ] {
            let domain = address.split('@').nth(1).unwrap();
            assert_eq!(
                denylist.check(address, domain),
                Some(RejectionReason::GenericPattern),
                "{address}"
            );
        }
        assert_eq!(denylist.check("marie.dupont@gmail.com", "gmail.com"), None);
        // "user" without digits is a real handle
        assert_eq!(denylist.check("user.kone@gmail.com", "gmail.com"), None);
    }

    #[test]
    fn test_manual_blacklist() {
        let mut denylist = denylist();
        assert!(denylist.blacklist(" Awa.Diop@Gmail.com "));
        assert!(!denylist.blacklist("awa.diop@gmail.com"));
        assert_eq!(
            denylist.check("awa.diop@gmail.com", "gmail.com"),
            Some(RejectionReason::ManuallyBlacklisted)
        );
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let rules = EmailRules {
            generic_patterns: vec!["^(unclosed@".to_string()],
            ..EmailRules::default()
        };
        let err = Denylist::from_rules(&rules).unwrap_err();
        assert!(err.to_string().contains("Invalid regex pattern"));
    }
}
