use crate::config::SourceRules;
use std::collections::HashSet;

pub const LINKEDIN_PUBLIC: &str = "linkedin_public";
pub const STUDENT_FORUM: &str = "student_forum";
pub const EDUCATIONAL_SITE: &str = "educational_site";
pub const PUBLIC_DIRECTORY: &str = "public_directory";

pub const DEFAULT_AUTHORIZED_SOURCES: [&str; 4] = [
    LINKEDIN_PUBLIC,
    STUDENT_FORUM,
    EDUCATIONAL_SITE,
    PUBLIC_DIRECTORY,
];

/// Provenance channels a contact may legitimately come from.
///
/// A well-formed address obtained through any other channel is still
/// rejected.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    authorized: HashSet<String>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::from_rules(&SourceRules::default())
    }
}

impl SourceRegistry {
    pub fn from_rules(rules: &SourceRules) -> Self {
        Self {
            authorized: rules
                .authorized
                .iter()
                .map(|tag| tag.trim().to_string())
                .collect(),
        }
    }

    pub fn is_authorized(&self, tag: &str) -> bool {
        self.authorized.contains(tag)
    }

    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.authorized.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = SourceRegistry::default();
        assert!(registry.is_authorized("linkedin_public"));
        assert!(registry.is_authorized("public_directory"));
        assert!(!registry.is_authorized("internal"));
        assert!(!registry.is_authorized("web"));
        // tags are exact, no case folding
        assert!(!registry.is_authorized("LinkedIn_Public"));
    }

    #[test]
    fn test_custom_registry() {
        let registry = SourceRegistry::from_rules(&SourceRules {
            authorized: vec![" alumni_board ".to_string()],
        });
        assert!(registry.is_authorized("alumni_board"));
        assert!(!registry.is_authorized("linkedin_public"));
        assert_eq!(registry.tags(), vec!["alumni_board"]);
    }
}
