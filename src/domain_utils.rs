use crate::record::EmailProvider;
use url::Url;

/// Minimal domain helpers shared by the validators and the ledger
pub struct DomainUtils;

impl DomainUtils {
    /// Extract domain from email address
    pub fn extract_domain(email: &str) -> Option<String> {
        email
            .split_once('@')
            .map(|(_, domain)| domain.to_lowercase())
            .filter(|domain| !domain.is_empty())
    }

    /// Hostname of an absolute URL, as the browser would report it
    pub fn url_host(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|host| host.to_lowercase()))
    }

    /// Institutional student domains look like `etu.<school>.<tld>`
    pub fn is_institutional(domain: &str, prefix: &str) -> bool {
        !prefix.is_empty() && domain.to_lowercase().starts_with(&prefix.to_lowercase())
    }

    /// Classify the mailbox provider of a domain.
    ///
    /// Substring based: `notgmail.fr` counts as gmail. Known limitation.
    pub fn email_provider(domain: &str) -> EmailProvider {
        let domain_lower = domain.to_lowercase();
        if domain_lower.contains("gmail") {
            EmailProvider::Gmail
        } else if domain_lower.contains("yahoo") {
            EmailProvider::Yahoo
        } else if domain_lower.contains("outlook") || domain_lower.contains("hotmail") {
            EmailProvider::Outlook
        } else if domain_lower.starts_with("etu.") {
            EmailProvider::Educational
        } else {
            EmailProvider::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            DomainUtils::extract_domain("Marie.Dupont@Gmail.com"),
            Some("gmail.com".to_string())
        );
        assert_eq!(DomainUtils::extract_domain("invalid"), None);
        assert_eq!(DomainUtils::extract_domain("trailing@"), None);
    }

    #[test]
    fn test_url_host() {
        assert_eq!(
            DomainUtils::url_host("https://linkedin.com/in/x"),
            Some("linkedin.com".to_string())
        );
        assert_eq!(
            DomainUtils::url_host("https://WWW.Etudiant.ma/forum?id=3"),
            Some("www.etudiant.ma".to_string())
        );
        assert_eq!(DomainUtils::url_host("not a url"), None);
    }

    #[test]
    fn test_email_provider() {
        assert_eq!(DomainUtils::email_provider("gmail.com"), EmailProvider::Gmail);
        assert_eq!(DomainUtils::email_provider("yahoo.fr"), EmailProvider::Yahoo);
        assert_eq!(
            DomainUtils::email_provider("hotmail.com"),
            EmailProvider::Outlook
        );
        assert_eq!(
            DomainUtils::email_provider("etu.univ-paris.fr"),
            EmailProvider::Educational
        );
        assert_eq!(DomainUtils::email_provider("orange.fr"), EmailProvider::Other);
        // substring heuristic
        assert_eq!(
            DomainUtils::email_provider("notgmail.fr"),
            EmailProvider::Gmail
        );
    }

    #[test]
    fn test_is_institutional() {
        assert!(DomainUtils::is_institutional("etu.um5.ac.ma", "etu."));
        assert!(!DomainUtils::is_institutional("student.um5.ac.ma", "etu."));
        assert!(!DomainUtils::is_institutional("etu.um5.ac.ma", ""));
    }
}
