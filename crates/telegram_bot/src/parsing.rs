/// Parses a user-typed amount or rate.
///
/// Accepts comma or dot as the fractional separator and tolerates grouping
/// whitespace ("1 000,50"). Returns `None` for anything that is not a
/// finite, strictly positive number.
pub(crate) fn parse_positive_number(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_integer_parses() {
        assert_eq!(parse_positive_number("50"), Some(50.0));
    }

    #[test]
    fn comma_and_dot_are_equivalent() {
        assert_eq!(parse_positive_number("12,5"), Some(12.5));
        assert_eq!(parse_positive_number("12.5"), Some(12.5));
    }

    #[test]
    fn grouping_whitespace_is_ignored() {
        assert_eq!(parse_positive_number(" 1 000,50 "), Some(1000.5));
    }

    #[test]
    fn zero_and_negative_are_rejected() {
        assert_eq!(parse_positive_number("0"), None);
        assert_eq!(parse_positive_number("-3"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_positive_number("abc"), None);
        assert_eq!(parse_positive_number("1.2.3"), None);
        assert_eq!(parse_positive_number(""), None);
        assert_eq!(parse_positive_number("inf"), None);
    }
}
