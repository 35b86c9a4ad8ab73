use super::{non_blank, Denylist, RejectionReason, Verdict};
use crate::config::EmailRules;
use crate::domain_utils::DomainUtils;
use crate::record::EmailProvider;
use regex::Regex;

const ADDRESS_GRAMMAR: &str = r"^[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail {
    /// Lowercased, trimmed address
    pub address: String,
    pub domain: String,
    pub provider: EmailProvider,
}

/// Format, denylist and provider allow-list checks for email addresses.
///
/// This deliberately accepts far less than RFC 5322: only personal mailboxes
/// at a handful of providers, or institutional student domains.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    grammar: Regex,
    denylist: Denylist,
    allowed_providers: Vec<String>,
    allowed_tlds: Vec<String>,
    institutional_prefix: String,
}

impl EmailValidator {
    pub fn new(rules: &EmailRules) -> anyhow::Result<Self> {
        Ok(Self {
            grammar: Regex::new(ADDRESS_GRAMMAR)?,
            denylist: Denylist::from_rules(rules)?,
            allowed_providers: rules
                .allowed_providers
                .iter()
                .map(|p| p.trim().to_lowercase())
                .collect(),
            allowed_tlds: rules
                .allowed_tlds
                .iter()
                .map(|t| t.trim().trim_start_matches('.').to_lowercase())
                .collect(),
            institutional_prefix: rules.institutional_prefix.trim().to_lowercase(),
        })
    }

    pub fn validate(&self, raw: Option<&str>) -> Verdict<ValidEmail> {
        let address = non_blank(raw)
            .ok_or(RejectionReason::Missing)?
            .to_lowercase();

        if !self.grammar.is_match(&address) {
            return Err(RejectionReason::InvalidFormat);
        }

        let domain = DomainUtils::extract_domain(&address).ok_or(RejectionReason::InvalidFormat)?;

        if let Some(reason) = self.denylist.check(&address, &domain) {
            return Err(reason);
        }

        if !self.is_allowed_domain(&domain) {
            return Err(RejectionReason::InvalidFormat);
        }

        Ok(ValidEmail {
            provider: DomainUtils::email_provider(&domain),
            address,
            domain,
        })
    }

    /// `<provider>.<tld>` exactly, or `<institutional prefix><anything>.<tld>`
    fn is_allowed_domain(&self, domain: &str) -> bool {
        let Some((name, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        if !self.allowed_tlds.iter().any(|allowed| allowed == tld) {
            return false;
        }

        if self.allowed_providers.iter().any(|provider| provider == name) {
            return true;
        }

        DomainUtils::is_institutional(name, &self.institutional_prefix)
            && name.len() > self.institutional_prefix.len()
    }

    pub fn blacklist(&mut self, address: &str) -> bool {
        self.denylist.blacklist(address)
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }
}
