use super::constants::KNOWN_RECORD_TYPES;
use crate::validation::ValidationResult;
use tracing::debug;

pub const MISSING_SOA_ERROR: &str = "Zone file must contain an SOA record";

/// Line-oriented structural checks for zone file text.
///
/// This is text scanning rather than a parse, so it can disagree with what
/// [`super::RecordParser`] extracts from the same content.
pub struct ZoneValidator;

impl ZoneValidator {
    pub fn validate(content: &str) -> ValidationResult {
        let mut errors = Vec::new();
        let mut has_soa = false;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            let line_number = idx + 1;

            if line.is_empty() || line.starts_with(';') || line.starts_with("//") {
                continue;
            }

            if line.contains("SOA") {
                has_soa = true;
            }

            if line.contains("IN") && class_token_ends(line).next().is_none() {
                errors.push(format!("Line {}: Invalid record class format", line_number));
            }

            if let Some(rtype) = record_type_after_class(line) {
                let upper = rtype.to_uppercase();
                if !KNOWN_RECORD_TYPES.contains(&upper.as_str()) {
                    errors.push(format!(
                        "Line {}: Unknown record type '{}'",
                        line_number, rtype
                    ));
                }
            }
        }

        if !has_soa {
            errors.push(MISSING_SOA_ERROR.to_string());
        }

        debug!("Zone validation finished with {} errors", errors.len());
        ValidationResult::new(errors, Vec::new())
    }
}

/// Byte offsets just past every `IN` with whitespace on both sides
fn class_token_ends(line: &str) -> impl Iterator<Item = usize> + '_ {
    line.match_indices("IN").filter_map(move |(pos, _)| {
        let before = line[..pos].chars().next_back()?;
        let after = line[pos + 2..].chars().next()?;
        (before.is_whitespace() && after.is_whitespace()).then_some(pos + 2)
    })
}

/// Token following the first standalone `IN` that is itself followed by whitespace
fn record_type_after_class(line: &str) -> Option<&str> {
    class_token_ends(line).find_map(|end| {
        let rest = line[end..].trim_start();
        let token_end = rest.find(char::is_whitespace)?;
        (token_end > 0).then(|| &rest[..token_end])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ZONE: &str = "$TTL 3600
@   IN  SOA ns1.example.com. admin.example.com. 2024010101 3600 900 604800 86400
@   IN  NS  ns1.example.com.
www IN  A   192.0.2.2
";

    #[test]
    fn test_valid_zone() {
        let result = ZoneValidator::validate(VALID_ZONE);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_soa() {
        let result = ZoneValidator::validate("www IN A 192.0.2.2\n");
        assert!(!result.valid);
        assert_eq!(result.errors, vec![MISSING_SOA_ERROR.to_string()]);
    }

    #[test]
    fn test_soa_in_comment_does_not_count() {
        let result = ZoneValidator::validate("; SOA goes here\nwww IN A 192.0.2.2\n");
        assert_eq!(result.errors, vec![MISSING_SOA_ERROR.to_string()]);
    }

    #[test]
    fn test_unknown_record_type() {
        let content = format!("{}mail IN MAILX something\n", VALID_ZONE);
        let result = ZoneValidator::validate(&content);
        assert_eq!(result.errors, vec!["Line 5: Unknown record type 'MAILX'"]);
    }

    #[test]
    fn test_record_type_check_is_case_insensitive() {
        let content = format!("{}www IN cname @\n", VALID_ZONE);
        assert!(ZoneValidator::validate(&content).valid);
    }

    #[test]
    fn test_invalid_class_format() {
        let content = format!("{}www\tINA 192.0.2.9\n", VALID_ZONE);
        let result = ZoneValidator::validate(&content);
        assert_eq!(result.errors, vec!["Line 5: Invalid record class format"]);
    }

    #[test]
    fn test_in_inside_a_word_is_flagged() {
        let result = ZoneValidator::validate("@ SOA x\n$INCLUDE other.zone\n");
        assert_eq!(result.errors, vec!["Line 2: Invalid record class format"]);
    }

    #[test]
    fn test_type_needs_trailing_value() {
        // No whitespace after the type, so no type is captured
        let result = ZoneValidator::validate("@ IN SOA\nwww IN BOGUS\n");
        assert!(result.valid);
    }
}
