use sha2::{Digest, Sha256};

/// SSM document type consumed by change-calendar gating.
pub const CALENDAR_DOCUMENT_TYPE: &str = "ChangeCalendar";
pub const CALENDAR_DOCUMENT_FORMAT: &str = "TEXT";
/// Version marker sent with every update.
///
/// Kept as `$` for compatibility with the existing calendar provider, which
/// sends the same value. Live SSM only accepts `$LATEST`, `$DEFAULT`, or a
/// version number, so callers targeting it directly should expect a rejection.
pub const UPDATE_VERSION_MARKER: &str = "$";
pub const ASSUME_ROLE_SESSION_NAME: &str = "Calendar-Setup-Role";

/// Hex SHA-256 of a calendar body, logged in place of the body itself.
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex_digest() {
        let first = content_fingerprint("MON-FRI");
        assert_eq!(first.len(), 64);
        assert_eq!(first, content_fingerprint("MON-FRI"));
        assert_ne!(first, content_fingerprint("SAT-SUN"));
    }

    #[test]
    fn fingerprint_of_empty_body_matches_known_digest() {
        assert_eq!(
            content_fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn update_marker_matches_existing_provider() {
        assert_eq!(UPDATE_VERSION_MARKER, "$");
    }
}
