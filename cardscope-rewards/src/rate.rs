use regex::Regex;

/// Number (optional decimal part) directly before a percent sign
const PERCENT_PATTERN: &str = r"([0-9]+\.?[0-9]*)\s*%";

/// Turns free-form rate text ("5%", "1.5% Cash Back", "3x points") into a percentage.
///
/// Never fails: anything it cannot read is 0.0.
#[derive(Debug, Clone)]
pub struct RateExtractor {
    percent: Regex,
}

impl RateExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            percent: Regex::new(PERCENT_PATTERN)?,
        })
    }

    pub fn extract(&self, raw: &str) -> f64 {
        if raw.trim().is_empty() {
            return 0.0;
        }

        if let Some(caps) = self.percent.captures(raw) {
            return caps[1].parse::<f64>().unwrap_or(0.0);
        }

        Self::extract_digits(raw)
    }

    pub fn extract_opt(&self, raw: Option<&str>) -> f64 {
        raw.map_or(0.0, |r| self.extract(r))
    }

    /// No percent sign: keep digits and dots, read them as one number with at
    /// most two fractional digits.
    fn extract_digits(raw: &str) -> f64 {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let parsed = match cleaned.find('.') {
            None if cleaned.is_empty() => return 0.0,
            None => cleaned.parse::<f64>(),
            Some(0) => return 0.0,
            Some(dot) => {
                let whole = &cleaned[..dot];
                let fraction = &cleaned[dot + 1..];
                let fraction = &fraction[..fraction.len().min(2)];
                format!("{whole}.{fraction}").parse::<f64>()
            }
        };

        parsed.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RateExtractor {
        RateExtractor::new().unwrap()
    }

    #[test]
    fn test_percent_forms() {
        let rx = extractor();
        assert_eq!(rx.extract("5%"), 5.0);
        assert_eq!(rx.extract("1.5% Cash Back"), 1.5);
        assert_eq!(rx.extract("1% back on purchases"), 1.0);
        assert_eq!(rx.extract("Up to 3 %"), 3.0);
        assert_eq!(rx.extract("$200 bonus, then 2% on everything"), 2.0);
    }

    #[test]
    fn test_fallback_without_percent() {
        let rx = extractor();
        assert_eq!(rx.extract("3x points"), 3.0);
        assert_eq!(rx.extract("1.257 back"), 1.25);
        assert_eq!(rx.extract("4"), 4.0);
    }

    #[test]
    fn test_unreadable_is_zero() {
        let rx = extractor();
        assert_eq!(rx.extract(""), 0.0);
        assert_eq!(rx.extract("   "), 0.0);
        assert_eq!(rx.extract("no number"), 0.0);
        assert_eq!(rx.extract(".5 back"), 0.0);
        assert_eq!(rx.extract("1.5.3"), 0.0);
        assert_eq!(rx.extract_opt(None), 0.0);
    }
}
