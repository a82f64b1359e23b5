//! Audit decision and line format.

use chrono::NaiveDateTime;

/// Paths containing this marker are audited even without an identity.
pub const CONNEXION_MARKER: &str = "connexion";

/// Rendered in place of a missing identity.
pub const ABSENT_IDENTITY: &str = "null";

/// Timestamp layout, local time with fractional seconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Decides which requests are audited.
///
/// Immutable once built; the prefix set comes from configuration.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    prefixes: Vec<String>,
}

impl AuditFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// True when the caller is identified (or the path is a connexion
    /// attempt) AND the path starts with an audited prefix.
    pub fn should_log(&self, path: &str, identity: Option<&str>) -> bool {
        let identified = present(identity).is_some();
        (identified || path.contains(CONNEXION_MARKER))
            && self
                .prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Format one audit line, without the terminator.
    pub fn format(path: &str, identity: Option<&str>, timestamp: &NaiveDateTime) -> String {
        format!(
            "Request intercepted: {} - {} by {}",
            timestamp.format(TIMESTAMP_FORMAT),
            path,
            present(identity).unwrap_or(ABSENT_IDENTITY)
        )
    }
}

fn present(identity: Option<&str>) -> Option<&str> {
    identity.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filter() -> AuditFilter {
        AuditFilter::new(["/utilisateur/connexion", "/file/archive", "/client/relation"])
    }

    #[test]
    fn connexion_path_logged_without_identity() {
        assert!(filter().should_log("/utilisateur/connexion", None));
    }

    #[test]
    fn identified_prefix_match_logged() {
        assert!(filter().should_log("/client/relation/42", Some("alice@x.com")));
        assert!(filter().should_log("/file/archive?id=7", Some("alice@x.com")));
    }

    #[test]
    fn unmatched_prefix_not_logged() {
        assert!(!filter().should_log("/public/health", Some("alice@x.com")));
        assert!(!filter().should_log("/public/connexion", None));
    }

    #[test]
    fn anonymous_without_marker_not_logged() {
        assert!(!filter().should_log("/file/archive", None));
        assert!(!filter().should_log("/file/archive", Some("")));
    }

    #[test]
    fn prefixes_are_case_sensitive() {
        assert!(!filter().should_log("/Client/relation/1", Some("alice@x.com")));
    }

    #[test]
    fn marker_anywhere_in_path() {
        let filter = AuditFilter::new(["/file"]);
        assert!(filter.should_log("/file/connexion-log", None));
    }

    #[test]
    fn filters_are_independent() {
        let narrow = AuditFilter::new(["/only"]);
        assert!(narrow.should_log("/only/this", Some("bob")));
        assert!(!narrow.should_log("/client/relation/1", Some("bob")));
        assert!(filter().should_log("/client/relation/1", Some("bob")));
    }

    #[test]
    fn format_line() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_milli_opt(10, 30, 45, 123)
            .unwrap();

        assert_eq!(
            AuditFilter::format("/client/relation/42", Some("alice@x.com"), &at),
            "Request intercepted: 2024-01-15T10:30:45.123 - /client/relation/42 by alice@x.com"
        );
        assert_eq!(
            AuditFilter::format("/utilisateur/connexion", None, &at),
            "Request intercepted: 2024-01-15T10:30:45.123 - /utilisateur/connexion by null"
        );
    }
}
