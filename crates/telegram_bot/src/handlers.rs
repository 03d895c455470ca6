use engine::{Direction, LedgerError, NewTrip, convert};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InlineKeyboardMarkup, MessageId, UserId},
};

use crate::{
    ConfigParameters,
    commands::Command,
    countries,
    flow::{DestinationOutcome, TripDraft},
    parsing,
    rates::RateError,
    state::Session,
    ui::{self, CallbackAction},
};

const HISTORY_LIMIT: u64 = 15;

/// Text plus an optional keyboard, ready to be sent or edited in place.
type View = (String, Option<InlineKeyboardMarkup>);

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = from.id;
    let chat_id = msg.chat.id;

    let view = match cmd {
        Command::Start => {
            if let Err(err) = cfg
                .ledger
                .add_user(ledger_user_id(user_id), from.username.as_deref())
                .await
            {
                storage_error_view(err)
            } else {
                let (text, kb) = ui::render_welcome(&from.first_name, cfg.currencies.len());
                (text, Some(kb))
            }
        }
        Command::Menu => {
            let (text, kb) = ui::render_menu();
            (text, Some(kb))
        }
        Command::NewTrip => start_trip_creation(&cfg, user_id).await,
        Command::Balance => balance_view(&cfg, user_id).await,
        Command::History => history_view(&cfg, user_id).await,
        Command::Switch => trips_view(&cfg, user_id).await,
        Command::SetRate => start_rate_change(&cfg, user_id).await,
        Command::Help => {
            let (text, kb) = ui::render_help(cfg.currencies.len());
            (text, Some(kb))
        }
    };

    send_view(&bot, chat_id, view).await
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let user_id = from.id;
    let chat_id = msg.chat.id;

    match cfg.sessions.get(user_id).await {
        Session::CreatingTrip(draft) => {
            handle_trip_step(&bot, chat_id, user_id, &cfg, draft, text).await
        }
        Session::AwaitingNewRate { trip_id } => {
            handle_new_rate(&bot, chat_id, user_id, &cfg, trip_id, text).await
        }
        // A fresh number replaces any expense still waiting for an answer.
        Session::Idle | Session::PendingExpense { .. } => {
            match parsing::parse_positive_number(text) {
                Some(amount) => capture_expense(&bot, chat_id, user_id, &cfg, amount).await,
                None => send_view(&bot, chat_id, (ui::USAGE_HINT.to_string(), None)).await,
            }
        }
    }
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();
    let user_id = q.from.id;

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        return Ok(());
    };

    let view = match action {
        CallbackAction::Menu => {
            let (text, kb) = ui::render_menu();
            (text, Some(kb))
        }
        CallbackAction::NewTrip => start_trip_creation(&cfg, user_id).await,
        CallbackAction::MyTrips => trips_view(&cfg, user_id).await,
        CallbackAction::Balance => balance_view(&cfg, user_id).await,
        CallbackAction::History => history_view(&cfg, user_id).await,
        CallbackAction::ChangeRate => start_rate_change(&cfg, user_id).await,
        CallbackAction::Help => {
            let (text, kb) = ui::render_help(cfg.currencies.len());
            (text, Some(kb))
        }
        CallbackAction::SwitchTrip(trip_id) => switch_trip(&cfg, user_id, trip_id).await,
        CallbackAction::ConfirmRate(accepted) => confirm_rate(&cfg, user_id, accepted).await,
        CallbackAction::ConfirmExpense(accepted) => confirm_expense(&cfg, user_id, accepted).await,
    };

    edit_view(&bot, chat_id, message_id, view).await
}

async fn handle_trip_step(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    cfg: &ConfigParameters,
    draft: TripDraft,
    text: &str,
) -> ResponseResult<()> {
    match draft {
        draft @ TripDraft::CurrencyFrom => {
            let Some(place) = countries::resolve(text, &cfg.currencies) else {
                return send_view(bot, chat_id, (ui::render_unknown_place(text), None)).await;
            };
            let prompt = ui::render_destination_prompt(&place);
            cfg.sessions
                .set(user_id, Session::CreatingTrip(draft.origin(place)))
                .await;
            send_view(bot, chat_id, (prompt, None)).await
        }
        // Typing during the confirmation branch re-runs the destination step.
        draft @ (TripDraft::CurrencyTo { .. } | TripDraft::ConfirmRate { .. }) => {
            let Some(to) = countries::resolve(text, &cfg.currencies) else {
                return send_view(bot, chat_id, (ui::render_unknown_place(text), None)).await;
            };
            let Some(from) = draft.origin_place().cloned() else {
                return Ok(());
            };
            if from.currency == to.currency {
                return send_view(bot, chat_id, (ui::DUPLICATE_CURRENCY.to_string(), None)).await;
            }

            let quote = match cfg.rates.unit_rate(&from.currency, &to.currency).await {
                Ok(rate) => Some(rate),
                Err(err) => {
                    log_rate_error("trip-creation quote", &err);
                    None
                }
            };
            let view: View = match quote {
                Some(rate) => {
                    let (text, kb) = ui::render_rate_confirm(&from, &to, rate);
                    (text, Some(kb))
                }
                None => (
                    format!(
                        "{}\n\n{}",
                        ui::RATE_UNAVAILABLE,
                        ui::render_manual_rate_prompt(&from, &to, None)
                    ),
                    None,
                ),
            };

            match draft.destination(to, quote) {
                DestinationOutcome::Quoted(next) | DestinationOutcome::ManualEntry(next) => {
                    cfg.sessions
                        .set(user_id, Session::CreatingTrip(next))
                        .await;
                    send_view(bot, chat_id, view).await
                }
                DestinationOutcome::DuplicateCurrency(_) | DestinationOutcome::NotAsked(_) => {
                    Ok(())
                }
            }
        }
        draft @ TripDraft::ManualRate { .. } => {
            let Some(rate) = parsing::parse_positive_number(text) else {
                return send_view(bot, chat_id, (ui::INVALID_NUMBER.to_string(), None)).await;
            };
            let (Some(from), Some(to)) = (draft.origin_place(), draft.destination_place()) else {
                return Ok(());
            };
            let prompt = ui::render_rate_accepted(from, to, rate);
            cfg.sessions
                .set(user_id, Session::CreatingTrip(draft.manual_rate(rate)))
                .await;
            send_view(bot, chat_id, (prompt, None)).await
        }
        draft @ TripDraft::InitialAmount { .. } => {
            let Some(amount) = parsing::parse_positive_number(text) else {
                return send_view(bot, chat_id, (ui::INVALID_NUMBER.to_string(), None)).await;
            };
            let (Some(from), Some(to)) = (draft.origin_place(), draft.destination_place()) else {
                return Ok(());
            };
            let Some(rate) = draft.rate() else {
                return Ok(());
            };

            let provider = match cfg.rates.convert(amount, &from.currency, &to.currency).await {
                Ok(value) => Some(value),
                Err(err) => {
                    log_rate_error("initial-amount conversion", &err);
                    None
                }
            };
            let quote = convert::resolve(provider, amount, rate, Direction::Forward);

            let new_trip = NewTrip {
                user_id: ledger_user_id(user_id),
                trip_name: format!("{} → {}", from.country, to.country),
                country_from: from.country.clone(),
                country_to: to.country.clone(),
                currency_from: from.currency.clone(),
                currency_to: to.currency.clone(),
                exchange_rate: rate,
                initial_amount_from: amount,
                balance_to: quote.amount,
            };

            match cfg.ledger.create_trip(new_trip.clone()).await {
                Ok(trip_id) => {
                    tracing::info!("Created trip {trip_id} for user {user_id}");
                    cfg.sessions.clear(user_id).await;
                    let (text, kb) = ui::render_trip_created(&new_trip);
                    send_view(bot, chat_id, (text, Some(kb))).await
                }
                Err(err) => send_view(bot, chat_id, storage_error_view(err)).await,
            }
        }
    }
}

async fn handle_new_rate(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    cfg: &ConfigParameters,
    trip_id: i32,
    text: &str,
) -> ResponseResult<()> {
    let Some(rate) = parsing::parse_positive_number(text) else {
        return send_view(bot, chat_id, (ui::INVALID_NUMBER.to_string(), None)).await;
    };

    match cfg.ledger.update_exchange_rate(trip_id, rate).await {
        Ok(Some(trip)) => {
            cfg.sessions.clear(user_id).await;
            send_view(bot, chat_id, (ui::render_rate_updated(&trip), None)).await
        }
        Ok(None) => {
            cfg.sessions.clear(user_id).await;
            send_view(bot, chat_id, (ui::TRIP_NOT_FOUND.to_string(), None)).await
        }
        Err(err) => send_view(bot, chat_id, storage_error_view(err)).await,
    }
}

async fn capture_expense(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    cfg: &ConfigParameters,
    amount: f64,
) -> ResponseResult<()> {
    let trip = match cfg.ledger.active_trip(ledger_user_id(user_id)).await {
        Ok(trip) => trip,
        Err(err) => return send_view(bot, chat_id, storage_error_view(err)).await,
    };
    let Some(trip) = trip else {
        return send_view(bot, chat_id, (ui::NO_ACTIVE_TRIP.to_string(), None)).await;
    };

    // Entered in the destination currency; derive the home-currency side.
    let provider = match cfg
        .rates
        .convert(amount, &trip.currency_to, &trip.currency_from)
        .await
    {
        Ok(value) => Some(value),
        Err(err) => {
            log_rate_error("expense conversion", &err);
            None
        }
    };
    let quote = convert::resolve(provider, amount, trip.exchange_rate, Direction::Reverse);

    cfg.sessions
        .set(
            user_id,
            Session::PendingExpense {
                amount_to: amount,
                amount_from: quote.amount,
            },
        )
        .await;

    let (text, kb) = ui::render_expense_confirm(amount, quote.amount, &trip);
    send_view(bot, chat_id, (text, Some(kb))).await
}

async fn start_trip_creation(cfg: &ConfigParameters, user_id: UserId) -> View {
    cfg.sessions
        .set(user_id, Session::CreatingTrip(TripDraft::new()))
        .await;
    (ui::render_creation_start(), None)
}

async fn start_rate_change(cfg: &ConfigParameters, user_id: UserId) -> View {
    let trip = match cfg.ledger.active_trip(ledger_user_id(user_id)).await {
        Ok(trip) => trip,
        Err(err) => return storage_error_view(err),
    };
    let Some(trip) = trip else {
        return (ui::NO_ACTIVE_TRIP.to_string(), None);
    };

    cfg.sessions
        .set(
            user_id,
            Session::AwaitingNewRate {
                trip_id: trip.trip_id,
            },
        )
        .await;
    (ui::render_rate_prompt(&trip), None)
}

async fn balance_view(cfg: &ConfigParameters, user_id: UserId) -> View {
    let trip = match cfg.ledger.active_trip(ledger_user_id(user_id)).await {
        Ok(trip) => trip,
        Err(err) => return storage_error_view(err),
    };
    let Some(trip) = trip else {
        return (ui::NO_ACTIVE_TRIP.to_string(), None);
    };

    match cfg.ledger.statistics(trip.trip_id).await {
        Ok(stats) => {
            let (text, kb) = ui::render_balance(&trip, &stats);
            (text, Some(kb))
        }
        Err(err) => storage_error_view(err),
    }
}

async fn history_view(cfg: &ConfigParameters, user_id: UserId) -> View {
    let trip = match cfg.ledger.active_trip(ledger_user_id(user_id)).await {
        Ok(trip) => trip,
        Err(err) => return storage_error_view(err),
    };
    let Some(trip) = trip else {
        return (ui::NO_ACTIVE_TRIP.to_string(), None);
    };

    match cfg.ledger.expenses(trip.trip_id, HISTORY_LIMIT).await {
        Ok(expenses) => {
            let (text, kb) = ui::render_history(&trip, &expenses);
            (text, Some(kb))
        }
        Err(err) => storage_error_view(err),
    }
}

async fn trips_view(cfg: &ConfigParameters, user_id: UserId) -> View {
    match cfg.ledger.trips(ledger_user_id(user_id)).await {
        Ok(trips) => {
            let (text, kb) = ui::render_trip_list(&trips);
            (text, Some(kb))
        }
        Err(err) => storage_error_view(err),
    }
}

async fn switch_trip(cfg: &ConfigParameters, user_id: UserId, trip_id: i32) -> View {
    match cfg
        .ledger
        .switch_active_trip(ledger_user_id(user_id), trip_id)
        .await
    {
        Ok(true) => match cfg.ledger.active_trip(ledger_user_id(user_id)).await {
            Ok(Some(trip)) => (ui::render_trip_activated(&trip), None),
            Ok(None) => (ui::TRIP_NOT_FOUND.to_string(), None),
            Err(err) => storage_error_view(err),
        },
        Ok(false) => (ui::TRIP_NOT_FOUND.to_string(), None),
        Err(err) => storage_error_view(err),
    }
}

async fn confirm_rate(cfg: &ConfigParameters, user_id: UserId, accepted: bool) -> View {
    let session = cfg.sessions.get(user_id).await;
    let Session::CreatingTrip(draft @ TripDraft::ConfirmRate { .. }) = session else {
        return (ui::DATA_EXPIRED.to_string(), None);
    };

    let next = if accepted {
        draft.accept_quote()
    } else {
        draft.decline_quote()
    };
    let prompt = match (next.origin_place(), next.destination_place()) {
        (Some(from), Some(to)) if !accepted => {
            ui::render_manual_rate_prompt(from, to, next.manual_hint())
        }
        (Some(from), _) => ui::render_quote_accepted(from),
        _ => return (ui::DATA_EXPIRED.to_string(), None),
    };

    cfg.sessions
        .set(user_id, Session::CreatingTrip(next))
        .await;
    (prompt, None)
}

async fn confirm_expense(cfg: &ConfigParameters, user_id: UserId, accepted: bool) -> View {
    let session = cfg.sessions.get(user_id).await;
    let Session::PendingExpense {
        amount_to,
        amount_from,
    } = session
    else {
        return (ui::DATA_EXPIRED.to_string(), None);
    };

    if !accepted {
        cfg.sessions.clear(user_id).await;
        return (ui::EXPENSE_DISCARDED.to_string(), None);
    }

    let trip = match cfg.ledger.active_trip(ledger_user_id(user_id)).await {
        Ok(trip) => trip,
        Err(err) => return storage_error_view(err),
    };
    let Some(trip) = trip else {
        return (ui::NO_ACTIVE_TRIP.to_string(), None);
    };

    match cfg
        .ledger
        .add_expense(trip.trip_id, amount_to, amount_from, None)
        .await
    {
        Ok(updated) => {
            cfg.sessions.clear(user_id).await;
            (
                ui::render_expense_recorded(amount_to, amount_from, &updated),
                None,
            )
        }
        Err(err) => storage_error_view(err),
    }
}

async fn send_view(bot: &Bot, chat_id: ChatId, (text, kb): View) -> ResponseResult<()> {
    let mut request = bot.send_message(chat_id, text);
    if let Some(kb) = kb {
        request = request.reply_markup(kb);
    }
    request.await?;
    Ok(())
}

async fn edit_view(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    (text, kb): View,
) -> ResponseResult<()> {
    let mut request = bot.edit_message_text(chat_id, message_id, text);
    if let Some(kb) = kb {
        request = request.reply_markup(kb);
    }
    request.await?;
    Ok(())
}

fn storage_error_view(err: LedgerError) -> View {
    tracing::error!("Ledger operation failed: {err}");
    (ui::STORAGE_ERROR.to_string(), None)
}

fn log_rate_error(context: &str, err: &RateError) {
    match err {
        RateError::Network(source) => {
            tracing::warn!("Rate provider unreachable during {context}: {source}");
        }
        RateError::Failure(info) => {
            tracing::warn!("Rate provider reported a failure during {context}: {info}");
        }
        RateError::Malformed => {
            tracing::warn!("Rate provider returned a malformed payload during {context}");
        }
    }
}

fn ledger_user_id(user_id: UserId) -> i64 {
    user_id.0 as i64
}
