use serde::Serialize;

/// Outcome of a structural check on artifact text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_iff_no_errors() {
        assert!(ValidationResult::new(vec![], vec!["w".to_string()]).is_valid());
        assert!(!ValidationResult::new(vec!["e".to_string()], vec![]).is_valid());
    }
}
