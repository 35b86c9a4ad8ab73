use crate::sources;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Policy tables for the validation pipeline.
///
/// Every list the engine checks against lives here so a policy change is
/// a YAML edit, not a code change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub email: EmailRules,
    #[serde(default)]
    pub phone: PhoneRules,
    #[serde(default)]
    pub sources: SourceRules,
    #[serde(default)]
    pub similarity: SimilarityWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Drop a record outright when its source URL is missing or malformed,
    /// even if its contact details are fine
    pub require_source_url: bool,
    /// Records without a declared source skip the authorization gate
    pub allow_undeclared_source: bool,
    /// Mark rejected emails MANUAL_VERIFICATION_NEEDED instead of REJECTED
    pub flag_rejected_for_review: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            require_source_url: true,
            allow_undeclared_source: true,
            flag_rejected_for_review: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRules {
    /// Mailbox providers accepted as `<provider>.<tld>`
    pub allowed_providers: Vec<String>,
    pub allowed_tlds: Vec<String>,
    /// Prefix of institutional student domains, e.g. `etu.`
    pub institutional_prefix: String,
    pub forbidden_domains: Vec<String>,
    /// Case-insensitive regexes matched against the whole address
    pub generic_patterns: Vec<String>,
    #[serde(default)]
    pub blacklisted_addresses: Vec<String>,
}

impl Default for EmailRules {
    fn default() -> Self {
        Self {
            allowed_providers: strings(&["gmail", "yahoo", "outlook", "hotmail"]),
            allowed_tlds: strings(&["com", "fr", "edu"]),
            institutional_prefix: "etu.".to_string(),
            forbidden_domains: strings(&[
                "email.com",
                "domain.com",
                "example.com",
                "test.com",
                "fake.com",
                "fakemail.com",
                "placeholder.com",
                "dummy.com",
                "sample.com",
                "invalid.com",
                "tempmail.com",
                "10minutemail.com",
                "guerrillamail.com",
            ]),
            generic_patterns: strings(&[
                r"^(info|contact|admin|support|noreply|no-reply)@",
                r"^[a-z]+\.[a-z]+@email\.com$",
                r"^user\d+@",
                r"^test\d*@",
                r"^student\d+@",
                r"^etudiant\d+@",
                r"^prenom\.nom@",
                r"^firstname\.lastname@",
            ]),
            blacklisted_addresses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitRange {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneRules {
    /// Only accept numbers whose calling code is in `allowed_calling_codes`
    pub restrict_calling_codes: bool,
    pub allowed_calling_codes: Vec<String>,
    /// Digits after the calling code when the allow-list applies
    pub national_digits: DigitRange,
    /// Digits after `+` when any calling code is accepted
    pub international_digits: DigitRange,
}

impl Default for PhoneRules {
    fn default() -> Self {
        Self {
            restrict_calling_codes: true,
            allowed_calling_codes: strings(&[
                "212", "229", "221", "225", "226", "227", "228", "230", "231", "232", "233",
                "234", "235", "236", "237", "238", "239", "240", "241", "242", "243", "244",
                "245", "246", "247", "248", "249", "250", "251", "252", "253", "254", "255",
                "256", "257", "258", "260", "261", "262", "263", "264", "265", "266", "267",
                "268", "269", "290", "291", "297", "298", "299",
            ]),
            national_digits: DigitRange { min: 8, max: 12 },
            international_digits: DigitRange { min: 8, max: 15 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRules {
    pub authorized: Vec<String>,
}

impl Default for SourceRules {
    fn default() -> Self {
        Self {
            authorized: sources::DEFAULT_AUTHORIZED_SOURCES
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub same_domain: u32,
    pub same_level: u32,
    pub shared_specialization_word: u32,
    pub professional_network: u32,
    pub professional_network_source: String,
    pub excellent_contact: u32,
    pub good_contact: u32,
    /// Candidates scoring at or below this are dropped
    pub relevance_floor: u32,
    pub default_count: usize,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            same_domain: 3,
            same_level: 2,
            shared_specialization_word: 1,
            professional_network: 2,
            professional_network_source: sources::LINKEDIN_PUBLIC.to_string(),
            excellent_contact: 3,
            good_contact: 1,
            relevance_floor: 2,
            default_count: 3,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {path}"))?;
        Ok(())
    }

    /// Structural checks that regex compilation cannot catch
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.email.allowed_tlds.is_empty() {
            anyhow::bail!("email.allowed_tlds must not be empty");
        }
        for (name, range) in [
            ("phone.national_digits", self.phone.national_digits),
            ("phone.international_digits", self.phone.international_digits),
        ] {
            if range.min == 0 || range.min > range.max {
                anyhow::bail!("{name}: invalid digit range {}..={}", range.min, range.max);
            }
        }
        if self.phone.restrict_calling_codes && self.phone.allowed_calling_codes.is_empty() {
            anyhow::bail!("phone.allowed_calling_codes is empty but restrict_calling_codes is set");
        }
        if let Some(code) = self
            .phone
            .allowed_calling_codes
            .iter()
            .find(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()))
        {
            anyhow::bail!("phone.allowed_calling_codes: '{code}' is not a numeric calling code");
        }
        if self.sources.authorized.is_empty() {
            log::warn!("No authorized sources configured; every declared source will be rejected");
        }
        Ok(())
    }
}
