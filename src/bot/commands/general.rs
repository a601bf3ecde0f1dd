//! General Discord commands - welcome, help and cancel.
//! These commands never start a dialog; `/start` and `/help` drop whatever dialog was
//! in flight.

const WELCOME: &str = "👋 Добро пожаловать в бот учёта рабочего времени!\n\n\
    Используйте команды:\n\
    /add - добавить часы работы\n\
    /payment - добавить оплату\n\
    /objects - список объектов\n\
    /report - отчёты\n\
    /help - справка";

const HELP_TEXT: &str = "📋 **Доступные команды:**\n\n\
    🔹 **/start** - регистрация пользователя\n\
    🔹 **/add** - добавить часы работы\n\
    🔹 **/payment** - добавить оплату\n\
    🔹 **/objects** - список объектов\n\
    🔹 **/report** - отчёты за месяц или период\n\
    🔹 **/cancel** - отменить текущее действие\n\
    🔹 **/help** - эта справка\n\n\
    📝 **Редактирование:**\n\
    🔹 `/edit_time <номер>` - редактировать часы\n\
    🔹 `/edit_pay <номер>` - редактировать оплату\n\n\
    💡 **Подсказки:**\n\
    • Даты вводите в формате ДД.ММ.ГГ\n\
    • Суммы вводите в рублях (например: 1500)\n\
    • Часы вводите целыми числами";

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{HELP_TEXT, WELCOME};
    use crate::{
        bot::{
            BotData,
            commands::{Entry, run_entry},
        },
        errors::{Error, Result},
    };

    /// Registers you and shows what the bot can do.
    #[poise::command(slash_command)]
    pub async fn start(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Notice(WELCOME)).await
    }

    /// Lists the available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Notice(HELP_TEXT)).await
    }

    /// Cancels the current dialog.
    #[poise::command(slash_command)]
    pub async fn cancel(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Cancel).await
    }
}

// Re-export all commands
pub use inner::*;
