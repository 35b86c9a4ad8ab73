use super::{non_blank, RejectionReason, Verdict};
use crate::config::PhoneRules;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPhone {
    /// `+` followed by digits only
    pub number: String,
    /// `+212` style prefix, known only when the calling-code allow-list applies
    pub calling_code: Option<String>,
}

/// International phone format, optionally restricted to an allow-list of
/// calling codes.
#[derive(Debug, Clone)]
pub struct PhoneValidator {
    pattern: Regex,
    separators: Regex,
    restricted: bool,
}

impl PhoneValidator {
    pub fn new(rules: &PhoneRules) -> anyhow::Result<Self> {
        let pattern = if rules.restrict_calling_codes {
            let codes = rules
                .allowed_calling_codes
                .iter()
                .map(|code| regex::escape(code.trim()))
                .collect::<Vec<_>>()
                .join("|");
            format!(
                r"^\+({codes})\d{{{},{}}}$",
                rules.national_digits.min, rules.national_digits.max
            )
        } else {
            format!(
                r"^\+\d{{{},{}}}$",
                rules.international_digits.min, rules.international_digits.max
            )
        };

        Ok(Self {
            pattern: Regex::new(&pattern)
                .map_err(|e| anyhow::anyhow!("Invalid phone pattern '{}': {}", pattern, e))?,
            separators: Regex::new(r"[\s\-().]")?,
            restricted: rules.restrict_calling_codes,
        })
    }

    pub fn validate(&self, raw: Option<&str>) -> Verdict<ValidPhone> {
        let raw = non_blank(raw).ok_or(RejectionReason::Missing)?;
        let number = self.separators.replace_all(raw, "").into_owned();

        let captures = self
            .pattern
            .captures(&number)
            .ok_or(RejectionReason::InvalidPhoneFormat)?;

        let calling_code = if self.restricted {
            captures.get(1).map(|code| format!("+{}", code.as_str()))
        } else {
            None
        };

        Ok(ValidPhone {
            number,
            calling_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> PhoneValidator {
        PhoneValidator::new(&PhoneRules::default()).unwrap()
    }

    fn open() -> PhoneValidator {
        PhoneValidator::new(&PhoneRules {
            restrict_calling_codes: false,
            ..PhoneRules::default()
        })
        .unwrap()
    }

    #[test]
    fn test_moroccan_number() {
        let phone = strict().validate(Some("+212612345678")).unwrap();
        assert_eq!(phone.number, "+212612345678");
        assert_eq!(phone.calling_code.as_deref(), Some("+212"));
    }

    #[test]
    fn test_separators_are_stripped() {
        let phone = strict().validate(Some("+221 (77) 123-45.67")).unwrap();
        assert_eq!(phone.number, "+221771234567");
        assert_eq!(phone.calling_code.as_deref(), Some("+221"));
    }

    #[test]
    fn test_calling_code_outside_allow_list() {
        assert_eq!(
            strict().validate(Some("+1555123456")),
            Err(RejectionReason::InvalidPhoneFormat)
        );
        assert_eq!(
            strict().validate(Some("+33612345678")),
            Err(RejectionReason::InvalidPhoneFormat)
        );
    }

    #[test]
    fn test_digit_count_bounds() {
        let validator = strict();
        // 7 digits after the code
        assert!(validator.validate(Some("+2126123456")).is_err());
        // 13 digits after the code
        assert!(validator.validate(Some("+2126123456789012")).is_err());
        assert!(validator.validate(Some("0612345678")).is_err());
    }

    #[test]
    fn test_missing() {
        assert_eq!(strict().validate(None), Err(RejectionReason::Missing));
        assert_eq!(strict().validate(Some("")), Err(RejectionReason::Missing));
    }

    #[test]
    fn test_open_mode_accepts_any_code() {
        let phone = open().validate(Some("+1555123456")).unwrap();
        assert_eq!(phone.number, "+1555123456");
        assert_eq!(phone.calling_code, None);
        assert!(open().validate(Some("+1234567")).is_err());
    }
}
