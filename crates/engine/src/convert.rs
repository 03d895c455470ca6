//! Pure conversion helpers.
//!
//! The rate provider is free to fail (timeout, malformed payload, explicit
//! failure flag); from this module's point of view all of those collapse
//! into "no provider amount". The policy is deterministic: trust the
//! provider's converted amount when one exists, otherwise derive one from
//! the trip's stored `exchange_rate`. There is no error path past this
//! point — a quote is always produced.

/// Which way an amount is converted relative to the trip's nominal
/// `currency_from → currency_to` direction.
///
/// Expense entries are typed in the destination currency and therefore
/// convert in [`Direction::Reverse`]; the initial amount is typed in the
/// home currency and converts in [`Direction::Forward`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Where the converted amount came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteSource {
    Provider,
    StoredRate,
}

/// A converted amount plus its provenance, for logging and display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quote {
    pub amount: f64,
    pub source: QuoteSource,
}

/// Converts `amount` using the stored rate only.
///
/// Forward multiplies, reverse divides. `stored_rate` is the trip's
/// `exchange_rate`, which is positive by construction.
#[must_use]
pub fn fallback(amount: f64, stored_rate: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Forward => amount * stored_rate,
        Direction::Reverse => amount / stored_rate,
    }
}

/// Resolves a conversion against an optional provider result.
///
/// `provider` is the converted amount the rate service returned, if it
/// returned one. Callers map every provider failure to `None` before
/// calling (and log the failure kind themselves).
#[must_use]
pub fn resolve(provider: Option<f64>, amount: f64, stored_rate: f64, direction: Direction) -> Quote {
    match provider {
        Some(converted) => Quote {
            amount: converted,
            source: QuoteSource::Provider,
        },
        None => Quote {
            amount: fallback(amount, stored_rate, direction),
            source: QuoteSource::StoredRate,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_fallback_multiplies_by_stored_rate() {
        assert_eq!(fallback(100_000.0, 0.011, Direction::Forward), 1100.0);
    }

    #[test]
    fn reverse_fallback_divides_by_stored_rate() {
        assert_eq!(fallback(50.0, 0.011, Direction::Reverse), 50.0 / 0.011);
    }

    #[test]
    fn provider_amount_wins_when_present() {
        let quote = resolve(Some(1085.5), 100_000.0, 0.011, Direction::Forward);
        assert_eq!(quote.amount, 1085.5);
        assert_eq!(quote.source, QuoteSource::Provider);
    }

    #[test]
    fn missing_provider_falls_back_deterministically() {
        let quote = resolve(None, 50.0, 0.011, Direction::Reverse);
        assert_eq!(quote.amount, 50.0 / 0.011);
        assert_eq!(quote.source, QuoteSource::StoredRate);

        // Same inputs, same fallback: the policy has no hidden state.
        let again = resolve(None, 50.0, 0.011, Direction::Reverse);
        assert_eq!(quote, again);
    }
}
