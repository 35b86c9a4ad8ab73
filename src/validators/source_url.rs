use super::{non_blank, RejectionReason, Verdict};
use crate::domain_utils::DomainUtils;
use regex::Regex;

const URL_GRAMMAR: &str = r"^([a-zA-Z][a-zA-Z0-9+.-]*)://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSourceUrl {
    pub url: String,
    /// Hostname, used for provenance-distribution reporting
    pub domain: String,
}

#[derive(Debug, Clone)]
pub struct SourceUrlValidator {
    grammar: Regex,
}

impl SourceUrlValidator {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            grammar: Regex::new(URL_GRAMMAR)?,
        })
    }

    pub fn validate(&self, raw: Option<&str>) -> Verdict<ValidSourceUrl> {
        let url = non_blank(raw).ok_or(RejectionReason::SourceUrlMissing)?;

        let captures = self
            .grammar
            .captures(url)
            .ok_or(RejectionReason::InvalidUrlFormat)?;

        let scheme = captures
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default();
        if scheme != "http" && scheme != "https" {
            return Err(RejectionReason::InvalidProtocol);
        }

        let domain = DomainUtils::url_host(url).ok_or(RejectionReason::InvalidUrlFormat)?;

        Ok(ValidSourceUrl {
            url: url.to_string(),
            domain,
        })
    }
}
