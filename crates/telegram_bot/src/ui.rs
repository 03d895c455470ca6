//! Message rendering and the typed callback vocabulary.

use engine::{Expense, NewTrip, Trip, TripStats};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::countries::{COUNTRY_CURRENCIES, Place};

/// Every button the bot ever emits, parsed back from the raw callback
/// payload. Unknown payloads fall out as `None` and are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CallbackAction {
    Menu,
    NewTrip,
    MyTrips,
    Balance,
    History,
    ChangeRate,
    Help,
    SwitchTrip(i32),
    ConfirmRate(bool),
    ConfirmExpense(bool),
}

impl CallbackAction {
    pub(crate) fn parse(data: &str) -> Option<Self> {
        Some(match data {
            "nav:menu" => Self::Menu,
            "menu:new_trip" => Self::NewTrip,
            "menu:trips" => Self::MyTrips,
            "menu:balance" => Self::Balance,
            "menu:history" => Self::History,
            "menu:set_rate" => Self::ChangeRate,
            "menu:help" => Self::Help,
            "rate:yes" => Self::ConfirmRate(true),
            "rate:no" => Self::ConfirmRate(false),
            "expense:yes" => Self::ConfirmExpense(true),
            "expense:no" => Self::ConfirmExpense(false),
            _ => {
                return data
                    .strip_prefix("switch:")
                    .and_then(|id| id.parse().ok())
                    .map(Self::SwitchTrip);
            }
        })
    }

    pub(crate) fn data(self) -> String {
        match self {
            Self::Menu => "nav:menu".to_string(),
            Self::NewTrip => "menu:new_trip".to_string(),
            Self::MyTrips => "menu:trips".to_string(),
            Self::Balance => "menu:balance".to_string(),
            Self::History => "menu:history".to_string(),
            Self::ChangeRate => "menu:set_rate".to_string(),
            Self::Help => "menu:help".to_string(),
            Self::SwitchTrip(trip_id) => format!("switch:{trip_id}"),
            Self::ConfirmRate(true) => "rate:yes".to_string(),
            Self::ConfirmRate(false) => "rate:no".to_string(),
            Self::ConfirmExpense(true) => "expense:yes".to_string(),
            Self::ConfirmExpense(false) => "expense:no".to_string(),
        }
    }
}

/// Two decimals, thousands grouped with a space.
pub(crate) fn format_amount(value: f64) -> String {
    let raw = format!("{value:.2}");
    let (sign, rest) = raw
        .strip_prefix('-')
        .map_or(("", raw.as_str()), |r| ("-", r));
    let (int_part, frac) = rest.split_once('.').unwrap_or((rest, "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac}")
}

/// Four decimals, no grouping.
pub(crate) fn format_rate(value: f64) -> String {
    format!("{value:.4}")
}

fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("✈️ New trip", CallbackAction::NewTrip.data()),
            InlineKeyboardButton::callback("🗂 My trips", CallbackAction::MyTrips.data()),
        ],
        vec![
            InlineKeyboardButton::callback("💰 Balance", CallbackAction::Balance.data()),
            InlineKeyboardButton::callback("📊 History", CallbackAction::History.data()),
        ],
        vec![
            InlineKeyboardButton::callback("💱 Change rate", CallbackAction::ChangeRate.data()),
            InlineKeyboardButton::callback("ℹ️ Help", CallbackAction::Help.data()),
        ],
    ])
}

fn back_to_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "◀️ Back to menu",
        CallbackAction::Menu.data(),
    )]])
}

pub(crate) fn render_menu() -> (String, InlineKeyboardMarkup) {
    ("📱 Main menu:".to_string(), main_menu_keyboard())
}

pub(crate) fn render_welcome(
    first_name: &str,
    currency_count: usize,
) -> (String, InlineKeyboardMarkup) {
    let supported = if currency_count > 0 {
        currency_count.to_string()
    } else {
        "150+".to_string()
    };
    let text = format!(
        "👋 Hi, {first_name}!\n\n\
         I track your travel budget across two currencies. 🌍\n\n\
         With me you can:\n\
         • create a wallet per trip\n\
         • record expenses in the local currency\n\
         • keep an eye on the exchange rate\n\
         • review everything you spent\n\n\
         💱 {supported} currencies supported.\n\n\
         Pick an action below 👇"
    );
    (text, main_menu_keyboard())
}

pub(crate) fn render_help(currency_count: usize) -> (String, InlineKeyboardMarkup) {
    let supported = if currency_count > 0 {
        currency_count.to_string()
    } else {
        "150+".to_string()
    };
    let text = format!(
        "ℹ️ How to use the bot\n\n\
         🔹 Creating a trip:\n\
         Press “New trip” and follow the steps. You can type a country name \
         (Russia, United States) or a currency code (RUB, USD) — {supported} \
         currencies are supported. The starting amount is converted at the \
         current rate.\n\n\
         🔹 Recording expenses:\n\
         Just send a number — it is treated as an expense in the destination \
         currency and you will be asked to confirm it.\n\n\
         🔹 Switching trips:\n\
         Use “My trips” to switch between trips.\n\n\
         🔹 Commands:\n\
         /start — start the bot\n\
         /menu — main menu\n\
         /newtrip — create a trip\n\
         /balance — show the balance\n\
         /history — expense history\n\
         /setrate — change the exchange rate\n\
         /switch — switch trips\n\
         /help — this message"
    );
    (text, back_to_menu_keyboard())
}

pub(crate) fn render_balance(trip: &Trip, stats: &TripStats) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "💰 Trip balance: {name}\n\n\
         💱 Rate: 1 {from} = {rate} {to}\n\n\
         💵 Remaining:\n  \
         • {balance_to} {to}\n  \
         • {balance_from} {from}\n\n\
         📈 Summary:\n  \
         • Starting amount: {initial} {from}\n  \
         • Spent: {spent_from} {from} ({count} expenses)",
        name = trip.trip_name,
        from = trip.currency_from,
        to = trip.currency_to,
        rate = format_rate(trip.exchange_rate),
        balance_to = format_amount(trip.balance_to),
        balance_from = format_amount(trip.balance_from),
        initial = format_amount(trip.initial_amount_from),
        spent_from = format_amount(stats.total_spent_from),
        count = stats.count,
    );
    (text, back_to_menu_keyboard())
}

pub(crate) fn render_history(trip: &Trip, expenses: &[Expense]) -> (String, InlineKeyboardMarkup) {
    let mut text = format!("📊 Expense history: {}\n", trip.trip_name);
    if expenses.is_empty() {
        text.push_str("\nNo expenses recorded yet.");
    } else {
        for expense in expenses {
            text.push_str(&format!(
                "\n{date}\n  💸 {to} {cur_to} = {from} {cur_from}\n",
                date = expense.created_at.format("%Y-%m-%d %H:%M"),
                to = format_amount(expense.amount_to),
                cur_to = trip.currency_to,
                from = format_amount(expense.amount_from),
                cur_from = trip.currency_from,
            ));
        }
    }
    (text, back_to_menu_keyboard())
}

pub(crate) fn render_trip_list(trips: &[Trip]) -> (String, InlineKeyboardMarkup) {
    if trips.is_empty() {
        return (
            "You have no trips yet. Create one with /newtrip.".to_string(),
            back_to_menu_keyboard(),
        );
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for trip in trips {
        let status = if trip.is_active { "🟢" } else { "⚪" };
        rows.push(vec![InlineKeyboardButton::callback(
            format!(
                "{status} {name} ({from} → {to})",
                name = trip.trip_name,
                from = trip.currency_from,
                to = trip.currency_to,
            ),
            CallbackAction::SwitchTrip(trip.trip_id).data(),
        )]);
    }
    rows.push(vec![InlineKeyboardButton::callback(
        "◀️ Back to menu",
        CallbackAction::Menu.data(),
    )]);

    (
        "🗂 Your trips — tap one to make it active:".to_string(),
        InlineKeyboardMarkup::new(rows),
    )
}

pub(crate) fn render_trip_activated(trip: &Trip) -> String {
    format!(
        "✅ Active trip: {name}\n\n\
         💱 Rate: 1 {from} = {rate} {to}\n\
         💰 Balance: {balance_to} {to} = {balance_from} {from}",
        name = trip.trip_name,
        from = trip.currency_from,
        to = trip.currency_to,
        rate = format_rate(trip.exchange_rate),
        balance_to = format_amount(trip.balance_to),
        balance_from = format_amount(trip.balance_from),
    )
}

fn country_options(exclude_currency: Option<&str>) -> String {
    let mut entries: Vec<(&str, &str)> = COUNTRY_CURRENCIES
        .iter()
        .copied()
        .filter(|(_, code)| exclude_currency != Some(*code))
        .collect();
    entries.sort_by_key(|(country, _)| *country);
    entries
        .iter()
        .map(|(country, code)| format!("• {country} ({code})"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn render_creation_start() -> String {
    format!(
        "✈️ Creating a new trip\n\n\
         Step 1 of 4: pick the home currency.\n\n\
         Type a country name or a currency code:\n\n\
         📍 Popular choices:\n{}",
        country_options(None)
    )
}

pub(crate) fn render_destination_prompt(from: &Place) -> String {
    format!(
        "✅ Home currency: {currency} ({country})\n\n\
         Step 2 of 4: pick the destination currency.\n\n\
         Type a country name or a currency code:\n\n\
         📍 Popular destinations:\n{options}",
        currency = from.currency,
        country = from.country,
        options = country_options(Some(from.currency.as_str())),
    )
}

pub(crate) fn render_unknown_place(input: &str) -> String {
    format!(
        "❌ No currency or country matches “{input}”.\n\n\
         Try:\n\
         • a country name: Russia, United States, China\n\
         • a currency code: RUB, USD, CNY, EUR, GBP"
    )
}

pub(crate) const DUPLICATE_CURRENCY: &str =
    "❌ The destination currency cannot equal the home currency.";

pub(crate) fn render_rate_confirm(
    from: &Place,
    to: &Place,
    quote: f64,
) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "✅ Destination: {country} ({currency})\n\n\
         💱 Current exchange rate:\n\
         1 {from} = {rate} {currency}\n\n\
         Step 3 of 4: use this rate?",
        country = to.country,
        currency = to.currency,
        from = from.currency,
        rate = format_rate(quote),
    );
    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Yes", CallbackAction::ConfirmRate(true).data()),
        InlineKeyboardButton::callback("❌ No", CallbackAction::ConfirmRate(false).data()),
    ]]);
    (text, kb)
}

pub(crate) fn render_manual_rate_prompt(from: &Place, to: &Place, hint: Option<f64>) -> String {
    let mut text = format!(
        "Step 3 of 4: enter the exchange rate by hand.\n\n\
         Format: 1 {from} = ? {to}",
        from = from.currency,
        to = to.currency,
    );
    if let Some(hint) = hint {
        text.push_str(&format!("\nFor example: {}", format_rate(hint)));
    }
    text
}

pub(crate) const RATE_UNAVAILABLE: &str = "⚠️ The live rate could not be fetched.";

pub(crate) fn render_initial_amount_prompt(from: &Place) -> String {
    format!(
        "Step 4 of 4: enter the starting amount in {} you are taking on the trip:",
        from.currency
    )
}

pub(crate) fn render_quote_accepted(from: &Place) -> String {
    format!(
        "✅ Great, the rate is locked in.\n\n{}",
        render_initial_amount_prompt(from)
    )
}

pub(crate) fn render_rate_accepted(from: &Place, to: &Place, rate: f64) -> String {
    format!(
        "✅ Rate accepted: 1 {from_cur} = {rate} {to_cur}\n\n{prompt}",
        from_cur = from.currency,
        to_cur = to.currency,
        rate = format_rate(rate),
        prompt = render_initial_amount_prompt(from),
    )
}

pub(crate) fn render_trip_created(trip: &NewTrip) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "✅ Trip created!\n\n\
         🎉 {name}\n\
         💱 Rate: 1 {from} = {rate} {to}\n\n\
         💰 Starting balance:\n  \
         • {balance_to} {to}\n  \
         • {balance_from} {from}\n\n\
         Now send me numbers and I will record them as expenses!",
        name = trip.trip_name,
        from = trip.currency_from,
        to = trip.currency_to,
        rate = format_rate(trip.exchange_rate),
        balance_to = format_amount(trip.balance_to),
        balance_from = format_amount(trip.initial_amount_from),
    );
    (text, main_menu_keyboard())
}

pub(crate) fn render_expense_confirm(
    amount_to: f64,
    amount_from: f64,
    trip: &Trip,
) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "💸 {to} {cur_to} = {from} {cur_from}\n\nRecord as an expense?",
        to = format_amount(amount_to),
        cur_to = trip.currency_to,
        from = format_amount(amount_from),
        cur_from = trip.currency_from,
    );
    let kb = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Yes", CallbackAction::ConfirmExpense(true).data()),
        InlineKeyboardButton::callback("❌ No", CallbackAction::ConfirmExpense(false).data()),
    ]]);
    (text, kb)
}

pub(crate) fn render_expense_recorded(amount_to: f64, amount_from: f64, trip: &Trip) -> String {
    format!(
        "✅ Expense recorded!\n\n\
         💸 Spent: {to} {cur_to} = {from} {cur_from}\n\n\
         💰 Remaining: {balance_to} {cur_to} = {balance_from} {cur_from}",
        to = format_amount(amount_to),
        from = format_amount(amount_from),
        cur_to = trip.currency_to,
        cur_from = trip.currency_from,
        balance_to = format_amount(trip.balance_to),
        balance_from = format_amount(trip.balance_from),
    )
}

pub(crate) fn render_rate_prompt(trip: &Trip) -> String {
    format!(
        "💱 Changing the rate for: {name}\n\n\
         Current rate: 1 {from} = {rate} {to}\n\n\
         Enter the new rate (how much {to} for 1 {from}):",
        name = trip.trip_name,
        from = trip.currency_from,
        to = trip.currency_to,
        rate = format_rate(trip.exchange_rate),
    )
}

pub(crate) fn render_rate_updated(trip: &Trip) -> String {
    format!(
        "✅ Exchange rate updated!\n\n\
         💱 New rate: 1 {from} = {rate} {to}\n\n\
         💰 Recomputed balance:\n  \
         • {balance_to} {to}\n  \
         • {balance_from} {from}",
        from = trip.currency_from,
        to = trip.currency_to,
        rate = format_rate(trip.exchange_rate),
        balance_to = format_amount(trip.balance_to),
        balance_from = format_amount(trip.balance_from),
    )
}

pub(crate) const NO_ACTIVE_TRIP: &str =
    "You have no active trip. Create one with /newtrip.";

pub(crate) const USAGE_HINT: &str =
    "I did not understand that. Use /menu for the main menu, or send a number to record an expense.";

pub(crate) const DATA_EXPIRED: &str = "⌛ This confirmation has expired.";

pub(crate) const EXPENSE_DISCARDED: &str = "❌ Expense not recorded.";

pub(crate) const INVALID_NUMBER: &str = "❌ Invalid format. Send a number, e.g. 12.5";

pub(crate) const TRIP_NOT_FOUND: &str = "❌ That trip was not found.";

pub(crate) const STORAGE_ERROR: &str = "⚠️ Something went wrong on my side, try again later.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_group_thousands_with_spaces() {
        assert_eq!(format_amount(1_234_567.891), "1 234 567.89");
        assert_eq!(format_amount(999.0), "999.00");
        assert_eq!(format_amount(50.0), "50.00");
        assert_eq!(format_amount(-4545.4545), "-4 545.45");
    }

    #[test]
    fn rates_use_four_decimals() {
        assert_eq!(format_rate(0.011), "0.0110");
        assert_eq!(format_rate(91.5), "91.5000");
    }

    #[test]
    fn callback_actions_round_trip() {
        let actions = [
            CallbackAction::Menu,
            CallbackAction::NewTrip,
            CallbackAction::MyTrips,
            CallbackAction::Balance,
            CallbackAction::History,
            CallbackAction::ChangeRate,
            CallbackAction::Help,
            CallbackAction::SwitchTrip(42),
            CallbackAction::ConfirmRate(true),
            CallbackAction::ConfirmRate(false),
            CallbackAction::ConfirmExpense(true),
            CallbackAction::ConfirmExpense(false),
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(&action.data()), Some(action));
        }
    }

    #[test]
    fn unknown_callback_data_is_rejected() {
        assert_eq!(CallbackAction::parse("menu:unknown"), None);
        assert_eq!(CallbackAction::parse("switch:not-a-number"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }
}
