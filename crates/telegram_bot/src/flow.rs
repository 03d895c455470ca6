//! Trip-creation dialogue steps.
//!
//! The steps form a fixed ladder: origin currency, destination currency,
//! rate resolution (live quote confirmation or manual entry), initial
//! amount. Transitions consume the current step and hand back the next
//! one; a transition that does not apply to the current step returns it
//! unchanged, so no input can jump the ladder.

use crate::countries::Place;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TripDraft {
    /// Waiting for the origin country or currency code.
    CurrencyFrom,
    /// Waiting for the destination country or currency code.
    CurrencyTo { from: Place },
    /// A live quote was fetched and awaits a yes/no answer. Typing a new
    /// destination instead of answering re-runs the destination step.
    ConfirmRate { from: Place, to: Place, quote: f64 },
    /// Waiting for a hand-typed rate; `hint` is the declined quote, shown
    /// as an example when one exists.
    ManualRate {
        from: Place,
        to: Place,
        hint: Option<f64>,
    },
    /// Waiting for the starting amount in the origin currency.
    InitialAmount { from: Place, to: Place, rate: f64 },
}

/// What happened when a destination was offered to the draft.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DestinationOutcome {
    /// Live quote available; the draft now awaits confirmation.
    Quoted(TripDraft),
    /// No live quote; the draft now awaits a manual rate.
    ManualEntry(TripDraft),
    /// Destination currency equals the origin currency; draft unchanged.
    DuplicateCurrency(TripDraft),
    /// The draft was not at the destination step; unchanged.
    NotAsked(TripDraft),
}

impl TripDraft {
    pub(crate) fn new() -> Self {
        TripDraft::CurrencyFrom
    }

    /// Records the origin and advances to the destination step.
    pub(crate) fn origin(self, place: Place) -> TripDraft {
        match self {
            TripDraft::CurrencyFrom => TripDraft::CurrencyTo { from: place },
            other => other,
        }
    }

    /// Records the destination and resolves the rate branch. `quote` is
    /// the live unit rate when the provider produced one.
    pub(crate) fn destination(self, place: Place, quote: Option<f64>) -> DestinationOutcome {
        match self {
            TripDraft::CurrencyTo { from } | TripDraft::ConfirmRate { from, .. } => {
                if from.currency == place.currency {
                    return DestinationOutcome::DuplicateCurrency(TripDraft::CurrencyTo { from });
                }
                match quote {
                    Some(rate) => DestinationOutcome::Quoted(TripDraft::ConfirmRate {
                        from,
                        to: place,
                        quote: rate,
                    }),
                    None => DestinationOutcome::ManualEntry(TripDraft::ManualRate {
                        from,
                        to: place,
                        hint: None,
                    }),
                }
            }
            other => DestinationOutcome::NotAsked(other),
        }
    }

    /// Fixes the rate to the confirmed quote and advances to the amount step.
    pub(crate) fn accept_quote(self) -> TripDraft {
        match self {
            TripDraft::ConfirmRate { from, to, quote } => TripDraft::InitialAmount {
                from,
                to,
                rate: quote,
            },
            other => other,
        }
    }

    /// Declines the quote; the rate must now be typed by hand.
    pub(crate) fn decline_quote(self) -> TripDraft {
        match self {
            TripDraft::ConfirmRate { from, to, quote } => TripDraft::ManualRate {
                from,
                to,
                hint: Some(quote),
            },
            other => other,
        }
    }

    /// Records a hand-typed rate and advances to the amount step.
    pub(crate) fn manual_rate(self, rate: f64) -> TripDraft {
        match self {
            TripDraft::ManualRate { from, to, .. } => TripDraft::InitialAmount { from, to, rate },
            other => other,
        }
    }

    pub(crate) fn origin_place(&self) -> Option<&Place> {
        match self {
            TripDraft::CurrencyFrom => None,
            TripDraft::CurrencyTo { from }
            | TripDraft::ConfirmRate { from, .. }
            | TripDraft::ManualRate { from, .. }
            | TripDraft::InitialAmount { from, .. } => Some(from),
        }
    }

    pub(crate) fn destination_place(&self) -> Option<&Place> {
        match self {
            TripDraft::CurrencyFrom | TripDraft::CurrencyTo { .. } => None,
            TripDraft::ConfirmRate { to, .. }
            | TripDraft::ManualRate { to, .. }
            | TripDraft::InitialAmount { to, .. } => Some(to),
        }
    }

    /// The agreed rate, once the draft reached the amount step.
    pub(crate) fn rate(&self) -> Option<f64> {
        match self {
            TripDraft::InitialAmount { rate, .. } => Some(*rate),
            _ => None,
        }
    }

    /// The declined quote carried into manual entry, if any.
    pub(crate) fn manual_hint(&self) -> Option<f64> {
        match self {
            TripDraft::ManualRate { hint, .. } => *hint,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(country: &str, currency: &str) -> Place {
        Place {
            country: country.to_string(),
            currency: currency.to_string(),
        }
    }

    fn russia() -> Place {
        place("Russia", "RUB")
    }

    fn usa() -> Place {
        place("United States", "USD")
    }

    #[test]
    fn the_ladder_cannot_be_skipped() {
        // No transition from the first step reaches the amount step.
        assert_eq!(TripDraft::new().manual_rate(0.011), TripDraft::CurrencyFrom);
        assert_eq!(TripDraft::new().accept_quote(), TripDraft::CurrencyFrom);
        assert!(matches!(
            TripDraft::new().destination(usa(), Some(0.011)),
            DestinationOutcome::NotAsked(TripDraft::CurrencyFrom)
        ));
    }

    #[test]
    fn full_path_through_the_quote_branch() {
        let draft = TripDraft::new().origin(russia());
        let DestinationOutcome::Quoted(draft) = draft.destination(usa(), Some(0.011)) else {
            panic!("expected a quoted outcome");
        };
        assert_eq!(
            draft.accept_quote(),
            TripDraft::InitialAmount {
                from: russia(),
                to: usa(),
                rate: 0.011,
            }
        );
    }

    #[test]
    fn declining_the_quote_keeps_it_as_a_hint() {
        let draft = TripDraft::new().origin(russia());
        let DestinationOutcome::Quoted(draft) = draft.destination(usa(), Some(0.011)) else {
            panic!("expected a quoted outcome");
        };
        let draft = draft.decline_quote();
        assert_eq!(
            draft,
            TripDraft::ManualRate {
                from: russia(),
                to: usa(),
                hint: Some(0.011),
            }
        );
        assert_eq!(
            draft.manual_rate(0.012),
            TripDraft::InitialAmount {
                from: russia(),
                to: usa(),
                rate: 0.012,
            }
        );
    }

    #[test]
    fn provider_failure_redirects_to_manual_entry() {
        let draft = TripDraft::new().origin(russia());
        assert!(matches!(
            draft.destination(usa(), None),
            DestinationOutcome::ManualEntry(TripDraft::ManualRate { hint: None, .. })
        ));
    }

    #[test]
    fn duplicate_currency_keeps_the_destination_step() {
        let draft = TripDraft::new().origin(place("Germany", "EUR"));
        let outcome = draft.destination(place("France", "EUR"), Some(1.0));
        let DestinationOutcome::DuplicateCurrency(draft) = outcome else {
            panic!("expected a duplicate-currency outcome");
        };
        // The origin survives; the offered destination was discarded.
        assert_eq!(
            draft,
            TripDraft::CurrencyTo {
                from: place("Germany", "EUR"),
            }
        );
    }

    #[test]
    fn a_new_destination_overrides_an_unanswered_quote() {
        let draft = TripDraft::new().origin(russia());
        let DestinationOutcome::Quoted(draft) = draft.destination(usa(), Some(0.011)) else {
            panic!("expected a quoted outcome");
        };
        let outcome = draft.destination(place("Thailand", "THB"), Some(0.35));
        assert!(matches!(
            outcome,
            DestinationOutcome::Quoted(TripDraft::ConfirmRate { ref to, quote, .. })
                if to.currency == "THB" && quote == 0.35
        ));
    }
}
