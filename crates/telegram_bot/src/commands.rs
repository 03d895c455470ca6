//! Command surface.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Travel budget commands:")]
pub(crate) enum Command {
    #[command(description = "register and show the main menu.")]
    Start,
    #[command(description = "show the main menu.")]
    Menu,
    #[command(description = "create a new trip.")]
    NewTrip,
    #[command(description = "show the active trip balance.")]
    Balance,
    #[command(description = "show recent expenses.")]
    History,
    #[command(description = "list trips and switch the active one.")]
    Switch,
    #[command(description = "change the exchange rate of the active trip.")]
    SetRate,
    #[command(description = "how to use the bot.")]
    Help,
}
