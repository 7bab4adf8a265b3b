// Input Gatekeeper
// Shared minimum-length and truncation policy applied before inference

use super::error::DetectError;

/// Minimum number of non-whitespace-trimmed characters accepted.
pub const DEFAULT_MIN_INPUT_LENGTH: usize = 2;
/// Character budget forwarded to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolicy {
    pub min_input_length: usize,
    pub max_input_chars: usize,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            min_input_length: DEFAULT_MIN_INPUT_LENGTH,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl InputPolicy {
    pub fn new(min_input_length: usize, max_input_chars: usize) -> Self {
        Self {
            min_input_length,
            max_input_chars,
        }
    }

    /// Validate `text` and return the prefix that should be sent to the model.
    ///
    /// Length checks run on the trimmed text; the returned slice is taken
    /// from the original input, cut at `max_input_chars` characters.
    pub fn admit<'a>(&self, text: &'a str) -> Result<&'a str, DetectError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DetectError::EmptyInput);
        }

        let actual = trimmed.chars().count();
        if actual < self.min_input_length {
            return Err(DetectError::InputTooShort {
                min: self.min_input_length,
                actual,
            });
        }

        let admitted = truncate_chars(text, self.max_input_chars);
        if admitted.trim().is_empty() {
            return Err(DetectError::EmptyInput);
        }
        Ok(admitted)
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_whitespace() {
        let policy = InputPolicy::default();
        assert_eq!(policy.admit(""), Err(DetectError::EmptyInput));
        assert_eq!(policy.admit("  \n\t "), Err(DetectError::EmptyInput));
    }

    #[test]
    fn test_rejects_short_after_trim() {
        let policy = InputPolicy::default();
        assert_eq!(
            policy.admit("   a   "),
            Err(DetectError::InputTooShort { min: 2, actual: 1 })
        );
        assert_eq!(policy.admit("ab"), Ok("ab"));
    }

    #[test]
    fn test_truncates_to_budget() {
        let policy = InputPolicy::new(2, 5);
        assert_eq!(policy.admit("hello world"), Ok("hello"));
        assert_eq!(policy.admit("hey"), Ok("hey"));
    }

    #[test]
    fn test_truncation_keeps_leading_whitespace() {
        let policy = InputPolicy::new(2, 4);
        assert_eq!(policy.admit("  abcdef"), Ok("  ab"));
    }

    #[test]
    fn test_blank_prefix_is_never_admitted() {
        assert_eq!(InputPolicy::new(2, 0).admit("plenty of text"), Err(DetectError::EmptyInput));
        assert_eq!(InputPolicy::new(2, 3).admit("     words"), Err(DetectError::EmptyInput));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("检测人工智能文本", 4), "检测人工");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_min_length_counts_chars_not_bytes() {
        let policy = InputPolicy::new(3, 512);
        assert!(policy.admit("文本").is_err());
        assert!(policy.admit("文本好").is_ok());
    }
}
