//! SQL text sanitization.
//!
//! AI responses and user input arrive wrapped in markdown fences, prefixed with
//! a `Generated SQL:` label, or terminated with `;`. [`sanitize`] removes those
//! wrappers so the text can be submitted as a single statement.
//!
//! The transform is idempotent: `sanitize(&sanitize(s)) == sanitize(s)` for
//! every input. Sanitized text is re-sanitized whenever it is executed, so this
//! property is what keeps already-clean SQL intact.

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening fence, optionally followed by a SQL dialect tag.
///
/// Only known tags are stripped; a bare fence followed by a keyword on its own
/// line keeps the keyword.
static LEADING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^```(?:(?:sqlite|sparksql|spark|postgresql|postgres|mysql|tsql|databricks|sql)\b)?\s*",
    )
    .expect("valid fence regex")
});

static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```$").expect("valid fence regex"));

static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^generated\s+sql\s*:\s*").expect("valid label regex"));

const STATEMENT_TERMINATOR: char = ';';

/// Clean AI-produced or user-supplied SQL text.
///
/// Applies, in order: trim, strip leading/trailing code fences, strip a
/// `Generated SQL:` label, strip one trailing `;`, trim. The pass repeats until
/// the text stops changing.
///
/// ```rust
/// use querypilot_link::sanitize;
///
/// assert_eq!(sanitize("```sql\nSELECT 1```"), "SELECT 1");
/// assert_eq!(sanitize("Generated SQL: SELECT 1;"), "SELECT 1");
/// assert_eq!(sanitize("SELECT 1"), "SELECT 1");
/// ```
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// [`sanitize`] for optional input; `None` yields an empty string
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}

fn sanitize_pass(text: &str) -> String {
    let trimmed = text.trim();
    let unfenced = LEADING_FENCE.replace(trimmed, "");
    let unfenced = TRAILING_FENCE.replace(&unfenced, "");
    let unlabeled = LABEL.replace(&unfenced, "");
    let unterminated = unlabeled
        .strip_suffix(STATEMENT_TERMINATOR)
        .unwrap_or(&unlabeled);
    unterminated.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tagged_fence() {
        assert_eq!(sanitize("```sql\nSELECT 1```"), "SELECT 1");
        assert_eq!(sanitize("```SQL\nSELECT 1\n```"), "SELECT 1");
        assert_eq!(sanitize("```sql SELECT 1```"), "SELECT 1");
        assert_eq!(sanitize("```sqlite\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_strips_bare_fence() {
        assert_eq!(sanitize("```SELECT 1```"), "SELECT 1");
        assert_eq!(sanitize("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_bare_fence_keeps_leading_keyword() {
        assert_eq!(
            sanitize("```SELECT\n  COUNT(*) AS total_rides\nFROM rides```"),
            "SELECT\n  COUNT(*) AS total_rides\nFROM rides"
        );
        assert_eq!(
            sanitize("```WITH\nx AS (SELECT 1) SELECT * FROM x```"),
            "WITH\nx AS (SELECT 1) SELECT * FROM x"
        );
        assert_eq!(sanitize("```databricks\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_strips_label_and_terminator() {
        assert_eq!(sanitize("Generated SQL: SELECT 1;"), "SELECT 1");
        assert_eq!(sanitize("generated sql:SELECT 1"), "SELECT 1");
        assert_eq!(sanitize("  GENERATED SQL :  SELECT 1 ; "), "SELECT 1");
    }

    #[test]
    fn test_label_inside_fence() {
        assert_eq!(
            sanitize("```sql\nGenerated SQL: SELECT COUNT(*) FROM rides;\n```"),
            "SELECT COUNT(*) FROM rides"
        );
    }

    #[test]
    fn test_clean_input_is_unchanged() {
        assert_eq!(sanitize("SELECT 1"), "SELECT 1");
        assert_eq!(sanitize("  SELECT 1\n"), "SELECT 1");
        let multi = "SELECT a,\n       b\nFROM t\nWHERE c = 'x;y'";
        assert_eq!(sanitize(multi), multi);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n\t"), "");
        assert_eq!(sanitize("```"), "");
        assert_eq!(sanitize("```sql\n```"), "");
        assert_eq!(sanitize_opt(None), "");
        assert_eq!(sanitize_opt(Some(" SELECT 1; ")), "SELECT 1");
    }

    #[test]
    fn test_repeated_markers_reach_fixed_point() {
        assert_eq!(sanitize("SELECT 1;;"), "SELECT 1");
        assert_eq!(sanitize("```sql\n```sql\nSELECT 1\n```\n```"), "SELECT 1");
        for input in ["SELECT 1;;", "``````", "Generated SQL: Generated SQL: x;"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_semicolon_inside_statement_is_kept() {
        assert_eq!(
            sanitize("SELECT ';' AS sep;"),
            "SELECT ';' AS sep"
        );
    }
}
