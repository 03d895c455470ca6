//! Bundled country reference data.
//!
//! Free text typed during trip creation is resolved against this table and
//! against the provider currency list fetched at startup. The table is a
//! curated set of popular destinations, not an exhaustive gazetteer; any
//! currency the provider knows is still accepted by code.

use std::collections::HashMap;

/// Country display name → ISO currency code.
pub(crate) const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("Russia", "RUB"),
    ("United States", "USD"),
    ("China", "CNY"),
    ("Japan", "JPY"),
    ("United Kingdom", "GBP"),
    ("European Union", "EUR"),
    ("Germany", "EUR"),
    ("France", "EUR"),
    ("Spain", "EUR"),
    ("Italy", "EUR"),
    ("South Korea", "KRW"),
    ("India", "INR"),
    ("Brazil", "BRL"),
    ("Mexico", "MXN"),
    ("Argentina", "ARS"),
    ("Chile", "CLP"),
    ("Colombia", "COP"),
    ("Peru", "PEN"),
    ("Vietnam", "VND"),
    ("South Africa", "ZAR"),
    ("Turkey", "TRY"),
    ("Ukraine", "UAH"),
    ("Kazakhstan", "KZT"),
    ("Kyrgyzstan", "KGS"),
    ("Belarus", "BYN"),
    ("Armenia", "AMD"),
    ("Azerbaijan", "AZN"),
    ("Thailand", "THB"),
    ("Indonesia", "IDR"),
    ("Malaysia", "MYR"),
    ("Singapore", "SGD"),
    ("Philippines", "PHP"),
    ("Australia", "AUD"),
    ("New Zealand", "NZD"),
    ("Canada", "CAD"),
    ("Switzerland", "CHF"),
    ("Sweden", "SEK"),
    ("Norway", "NOK"),
    ("Denmark", "DKK"),
    ("Poland", "PLN"),
    ("Czech Republic", "CZK"),
    ("Hungary", "HUF"),
    ("Romania", "RON"),
    ("Bulgaria", "BGN"),
    ("Israel", "ILS"),
    ("United Arab Emirates", "AED"),
    ("Saudi Arabia", "SAR"),
    ("Egypt", "EGP"),
    ("Morocco", "MAD"),
    ("Tunisia", "TND"),
];

/// A resolved trip endpoint: a display name plus the currency spent there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Place {
    pub country: String,
    pub currency: String,
}

/// Resolves user input to a place, in order: exact country name, currency
/// code known to the provider or the bundled table, case-insensitive
/// substring of a country name. `None` means the input matched nothing and
/// the caller must re-prompt.
pub(crate) fn resolve(input: &str, provider_currencies: &HashMap<String, String>) -> Option<Place> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for (country, code) in COUNTRY_CURRENCIES {
        if country.eq_ignore_ascii_case(input) {
            return Some(Place {
                country: (*country).to_string(),
                currency: (*code).to_string(),
            });
        }
    }

    let code = input.to_ascii_uppercase();
    let known_to_provider = provider_currencies
        .keys()
        .any(|c| c.eq_ignore_ascii_case(&code));
    let known_to_table = COUNTRY_CURRENCIES.iter().any(|(_, c)| *c == code);
    if known_to_provider || known_to_table {
        let country = COUNTRY_CURRENCIES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(name, _)| (*name).to_string())
            .or_else(|| provider_currencies.get(&code).cloned())
            .unwrap_or_else(|| code.clone());
        return Some(Place {
            country,
            currency: code,
        });
    }

    let needle = input.to_lowercase();
    for (country, code) in COUNTRY_CURRENCIES {
        if country.to_lowercase().contains(&needle) {
            return Some(Place {
                country: (*country).to_string(),
                currency: (*code).to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_list() -> HashMap<String, String> {
        HashMap::from([
            ("USD".to_string(), "US Dollar".to_string()),
            ("THB".to_string(), "Thai Baht".to_string()),
            ("ISK".to_string(), "Icelandic Krona".to_string()),
        ])
    }

    #[test]
    fn exact_country_name_ignores_case() {
        let place = resolve("jApAn", &HashMap::new()).unwrap();
        assert_eq!(place.country, "Japan");
        assert_eq!(place.currency, "JPY");
    }

    #[test]
    fn currency_code_resolves_via_provider_list() {
        let place = resolve("isk", &provider_list()).unwrap();
        assert_eq!(place.currency, "ISK");
        // Not in the bundled table, so the provider display name is used.
        assert_eq!(place.country, "Icelandic Krona");
    }

    #[test]
    fn currency_code_resolves_from_table_when_provider_list_is_empty() {
        let place = resolve("rub", &HashMap::new()).unwrap();
        assert_eq!(place.country, "Russia");
        assert_eq!(place.currency, "RUB");
    }

    #[test]
    fn substring_matches_a_country_name() {
        let place = resolve("swit", &HashMap::new()).unwrap();
        assert_eq!(place.country, "Switzerland");
        assert_eq!(place.currency, "CHF");
    }

    #[test]
    fn exact_name_wins_over_substring() {
        // "Spain" is both an exact name and a substring of nothing else.
        let place = resolve("spain", &HashMap::new()).unwrap();
        assert_eq!(place.country, "Spain");
    }

    #[test]
    fn unknown_input_matches_nothing() {
        assert_eq!(resolve("Atlantis", &provider_list()), None);
        assert_eq!(resolve("   ", &provider_list()), None);
    }
}
