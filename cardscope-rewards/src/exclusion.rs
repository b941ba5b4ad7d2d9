use crate::matcher::normalize;

/// True when the merchant is carved out of a bonus.
///
/// A merchant is excluded if its normalized name contains an exclusion entry
/// or an entry contains the name ("Walmart" vs "Walmart Supercenter" both
/// ways). Blank entries and a blank/missing merchant never exclude.
pub fn is_merchant_excluded(merchant: Option<&str>, exclusions: &[String]) -> bool {
    let Some(merchant) = merchant.map(normalize).filter(|m| !m.is_empty()) else {
        return false;
    };

    exclusions
        .iter()
        .map(|e| normalize(e))
        .filter(|e| !e.is_empty())
        .any(|e| merchant.contains(&e) || e.contains(&merchant))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_substring_both_directions() {
        let exclusions = list(&["Walmart", "Target Superstore"]);
        assert!(is_merchant_excluded(Some("walmart supercenter"), &exclusions));
        assert!(is_merchant_excluded(Some("TARGET"), &exclusions));
        assert!(!is_merchant_excluded(Some("Costco"), &exclusions));
    }

    #[test]
    fn test_nothing_to_exclude() {
        assert!(!is_merchant_excluded(Some("Walmart"), &[]));
        assert!(!is_merchant_excluded(None, &list(&["Walmart"])));
        assert!(!is_merchant_excluded(Some("  "), &list(&["Walmart"])));
        assert!(!is_merchant_excluded(Some("Walmart"), &list(&["", "  "])));
    }
}
