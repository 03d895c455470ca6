//! Telegram front end.
//!
//! The bot owns no durable state of its own: trips and expenses live in the
//! injected [`engine::Ledger`], and dialogue progress lives in an in-process
//! session store that is lost on restart.

use std::{collections::HashMap, sync::Arc, time::Duration};

use engine::Ledger;
use teloxide::prelude::*;

mod commands;
mod countries;
mod flow;
mod handlers;
mod parsing;
mod rates;
mod state;
mod ui;

const DEFAULT_RATE_API: &str = "https://api.exchangerate.host";
const RATE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ConfigParameters {
    ledger: Ledger,
    rates: rates::RateClient,
    currencies: Arc<HashMap<String, String>>,
    sessions: state::SessionStore,
}

pub struct Bot {
    token: String,
    ledger: Ledger,
    rates: rates::RateClient,
}

impl Bot {
    pub fn new(
        token: &str,
        ledger: Ledger,
        rate_api: &str,
        rate_access_key: &str,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(RATE_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Self {
            token: token.to_string(),
            ledger,
            rates: rates::RateClient::new(
                client,
                rate_api.to_string(),
                rate_access_key.to_string(),
            ),
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        // One fetch at startup; the resolver falls back to the bundled
        // country table when the provider list is unavailable.
        let currencies = match self.rates.currencies().await {
            Ok(list) => {
                tracing::info!("Loaded {} currencies from the rate provider", list.len());
                list
            }
            Err(err) => {
                tracing::warn!("Currency list unavailable ({err}); using the bundled table only");
                HashMap::new()
            }
        };

        let parameters = ConfigParameters {
            ledger: self.ledger.clone(),
            rates: self.rates.clone(),
            currencies: Arc::new(currencies),
            sessions: state::SessionStore::default(),
        };

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .branch(
                        dptree::entry()
                            .filter_command::<commands::Command>()
                            .endpoint(handlers::handle_command),
                    )
                    .endpoint(handlers::handle_message),
            )
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    ledger: Option<Ledger>,
    rate_api: Option<String>,
    rate_access_key: String,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn ledger(mut self, ledger: Ledger) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn rate_api(mut self, base_url: &str) -> BotBuilder {
        self.rate_api = Some(base_url.to_string());
        self
    }

    pub fn rate_access_key(mut self, access_key: &str) -> BotBuilder {
        self.rate_access_key = access_key.to_string();
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let ledger = self
            .ledger
            .ok_or_else(|| "a ledger is required".to_string())?;
        let rate_api = self.rate_api.unwrap_or_else(|| DEFAULT_RATE_API.to_string());
        Bot::new(&self.token, ledger, &rate_api, &self.rate_access_key)
    }
}
