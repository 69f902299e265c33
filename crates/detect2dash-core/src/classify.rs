//! Class-name classification.
//!
//! Categories come from an ordered rule table: the first rule whose needle
//! occurs in the class name wins, and names matching no rule are
//! [`Category::Unknown`]. Correctness only looks at the defect suffix.

use serde::Serialize;
use std::fmt;

/// Class names ending with this suffix denote a defective product.
pub const DEFECT_SUFFIX: &str = "_avaria";

/// Coarse product type shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Blister,
    Frasco,
    Caixa,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Blister => "Blister",
            Category::Frasco => "Frasco",
            Category::Caixa => "Caixa",
            Category::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
struct CategoryRule {
    needle: &'static str,
    category: Category,
}

impl CategoryRule {
    const fn new(needle: &'static str, category: Category) -> Self {
        Self { needle, category }
    }

    fn matches(&self, class_name: &str) -> bool {
        class_name.contains(self.needle)
    }
}

/// Evaluated top to bottom.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::new("blister", Category::Blister),
    CategoryRule::new("frasco", Category::Frasco),
    CategoryRule::new("caixa", Category::Caixa),
];

/// Map a detected class name to its category.
pub fn classify(class_name: &str) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.matches(class_name))
        .map(|rule| rule.category)
        .unwrap_or(Category::Unknown)
}

/// `false` when the class name denotes a defect.
pub fn is_correct(class_name: &str) -> bool {
    !class_name.ends_with(DEFECT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(classify("blister_x"), Category::Blister);
        assert_eq!(classify("frasco_avaria"), Category::Frasco);
        assert_eq!(classify("caixa"), Category::Caixa);
        assert_eq!(classify("widget"), Category::Unknown);
        assert_eq!(classify(""), Category::Unknown);
    }

    #[test]
    fn test_rule_priority() {
        // Both needles present: blister is checked first.
        assert_eq!(classify("caixa_de_blister"), Category::Blister);
        assert_eq!(classify("frasco_na_caixa"), Category::Frasco);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(classify("Blister"), Category::Unknown);
        assert_eq!(classify("FRASCO"), Category::Unknown);
    }

    #[test]
    fn test_correctness() {
        assert!(is_correct("caixa"));
        assert!(is_correct("blister_ok"));
        assert!(!is_correct("frasco_avaria"));
        assert!(!is_correct("_avaria"));
        // Suffix only, not substring
        assert!(is_correct("blister_avaria_reparado"));
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Frasco).unwrap();
        assert_eq!(json, "\"Frasco\"");
        assert_eq!(Category::Unknown.to_string(), "Unknown");
    }
}
