use std::collections::BTreeMap;

/// Lower-case and trim a category or merchant label
pub(crate) fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Built-in alias groups: canonical category name to the labels that mean the same thing
pub fn default_aliases() -> BTreeMap<String, Vec<String>> {
    let groups: [(&str, &[&str]); 8] = [
        ("groceries", &["grocery", "supermarket", "supermarkets", "grocery stores"]),
        ("dining", &["restaurant", "restaurants", "food"]),
        ("gas", &["gas station", "gas stations", "fuel", "gas stations and ev charging"]),
        ("travel", &["hotel", "hotels", "airline", "airlines", "flights", "chase travel"]),
        ("online retail", &["online", "e-commerce", "internet", "amazon"]),
        (
            "streaming",
            &["streaming services", "select streaming services", "netflix", "hulu", "disney+"],
        ),
        ("department stores", &["department store", "old navy"]),
        (
            "entertainment",
            &[
                "live entertainment",
                "select live entertainment",
                "fitness clubs",
                "hair, nails and spa services",
            ],
        ),
    ];

    groups
        .into_iter()
        .map(|(canonical, aliases)| {
            (
                canonical.to_string(),
                aliases.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

#[derive(Debug, Clone)]
struct AliasGroup {
    canonical: String,
    aliases: Vec<String>,
}

impl AliasGroup {
    fn contains(&self, normalized: &str) -> bool {
        self.canonical == normalized || self.aliases.iter().any(|a| a == normalized)
    }
}

/// Decides whether two category labels name the same spending category.
///
/// Labels match when, after normalization, they are equal, one contains the
/// other, or both belong to the same alias group. Blank labels match nothing.
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    groups: Vec<AliasGroup>,
}

impl CategoryMatcher {
    pub fn new(aliases: &BTreeMap<String, Vec<String>>) -> Self {
        let groups = aliases
            .iter()
            .map(|(canonical, labels)| AliasGroup {
                canonical: normalize(canonical),
                aliases: labels.iter().map(|l| normalize(l)).collect(),
            })
            .collect();

        Self { groups }
    }

    pub fn matches(&self, left: Option<&str>, right: Option<&str>) -> bool {
        let (Some(left), Some(right)) = (left, right) else {
            return false;
        };

        let left = normalize(left);
        let right = normalize(right);
        if left.is_empty() || right.is_empty() {
            return false;
        }

        if left == right || left.contains(&right) || right.contains(&left) {
            return true;
        }

        self.groups
            .iter()
            .any(|g| g.contains(&left) && g.contains(&right))
    }
}

impl Default for CategoryMatcher {
    fn default() -> Self {
        Self::new(&default_aliases())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_substring() {
        let matcher = CategoryMatcher::default();
        assert!(matcher.matches(Some("Dining"), Some(" dining ")));
        assert!(matcher.matches(Some("grocery"), Some("groceries")));
        assert!(matcher.matches(Some("gas"), Some("Gas Stations")));
        assert!(!matcher.matches(Some("gas"), Some("travel")));
    }

    #[test]
    fn test_alias_groups_are_symmetric() {
        let matcher = CategoryMatcher::default();
        assert!(matcher.matches(Some("supermarkets"), Some("groceries")));
        assert!(matcher.matches(Some("groceries"), Some("supermarkets")));
        assert!(matcher.matches(Some("netflix"), Some("select streaming services")));
        assert!(matcher.matches(Some("select streaming services"), Some("netflix")));
        assert!(matcher.matches(Some("airlines"), Some("Hotels")));
    }

    #[test]
    fn test_groups_do_not_chain() {
        let matcher = CategoryMatcher::default();
        // "food" is dining, "supermarket" is groceries
        assert!(!matcher.matches(Some("food"), Some("supermarket")));
        assert!(!matcher.matches(Some("amazon"), Some("netflix")));
    }

    #[test]
    fn test_blank_or_missing_never_matches() {
        let matcher = CategoryMatcher::default();
        assert!(!matcher.matches(None, Some("dining")));
        assert!(!matcher.matches(Some("dining"), None));
        assert!(!matcher.matches(Some(""), Some("dining")));
        assert!(!matcher.matches(Some("  "), Some("  ")));
    }

    #[test]
    fn test_custom_table() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Wholesale".to_string(), vec!["Warehouse Clubs".to_string()]);
        let matcher = CategoryMatcher::new(&aliases);

        assert!(matcher.matches(Some("warehouse clubs"), Some("wholesale")));
        assert!(!matcher.matches(Some("supermarkets"), Some("groceries")));
    }
}
