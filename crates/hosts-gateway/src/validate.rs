//! Line-oriented syntax check for hosts-file content.

use hosts_model::{HostsError, Result};

/// Validate hosts-file content before it is written.
///
/// Blank lines and comment lines (first non-whitespace character `#`) are
/// skipped. Every other line must split into at least two whitespace
/// separated tokens: an address followed by one or more hostnames. The first
/// violation fails with the 1-based line number. No address syntax is
/// checked beyond tokenization.
pub fn validate_hosts_content(content: &str) -> Result<()> {
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if line.split_whitespace().count() < 2 {
            return Err(HostsError::InvalidHostsLine {
                line: index + 1,
                reason: "expected an address followed by at least one hostname".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_entries_comments_and_blanks() {
        let content =
            "127.0.0.1 localhost\n\n# comment\n  # indented comment\n::1 localhost ip6\n";
        assert!(validate_hosts_content(content).is_ok());
    }

    #[test]
    fn rejects_single_token_line_with_line_number() {
        let content = "127.0.0.1 localhost\n# comment\n\nbadline";
        let error = validate_hosts_content(content).unwrap_err();
        match error {
            HostsError::InvalidHostsLine { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_first_violation_only() {
        let content = "bad\nalso-bad\n";
        let error = validate_hosts_content(content).unwrap_err();
        match error {
            HostsError::InvalidHostsLine { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepts_aliases_and_trailing_comment_tokens() {
        let content = "192.168.0.5 fileserver fs # the NAS box\n";
        assert!(validate_hosts_content(content).is_ok());
    }

    #[test]
    fn empty_content_is_valid() {
        assert!(validate_hosts_content("").is_ok());
    }
}
