pub mod handler;
pub mod process;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use handler::{BotSettings, CommandContext, CommandHandler, MessageBuffer, ReplySink};

/// Destination reported to the command handler for every facade call.
pub const DASHBOARD_DESTINATION: &str = "dashboard";

/// Reply when the first token is not in the command table.
pub const UNHANDLED_REPLY: &str = "Command not handled";

/// The fixed set of operations the facade can forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Status,
    ClosePosition,
    ApplySettings,
    AddRecipient,
    RemoveRecipient,
    ListRecipients,
    Pause,
    Resume,
    ProfitToday,
}

impl Operation {
    /// Look up an already lower-cased command key such as `/cls`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "/status" => Some(Self::Status),
            "/cls" => Some(Self::ClosePosition),
            "/settings" | "/setting" => Some(Self::ApplySettings),
            "/add_recipient" => Some(Self::AddRecipient),
            "/del_recipient" => Some(Self::RemoveRecipient),
            "/list_recipients" => Some(Self::ListRecipients),
            "/pause" => Some(Self::Pause),
            "/resume" => Some(Self::Resume),
            "/profit_today" => Some(Self::ProfitToday),
            _ => None,
        }
    }

    /// Stable operation name, used in logs and by the process handler.
    pub fn name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::ClosePosition => "close-position",
            Self::ApplySettings => "apply-settings",
            Self::AddRecipient => "add-recipient",
            Self::RemoveRecipient => "remove-recipient",
            Self::ListRecipients => "list-recipients",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::ProfitToday => "profit-today",
        }
    }
}

/// Operation key of a command line: its first whitespace token, lower-cased.
pub fn command_key(text: &str) -> String {
    text.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Routes command lines to the handler and owns the shared bot settings.
#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn CommandHandler>,
    settings: Arc<RwLock<BotSettings>>,
    supported_pairs: Arc<[String]>,
}

impl Dispatcher {
    pub fn new(
        handler: Arc<dyn CommandHandler>,
        settings: BotSettings,
        supported_pairs: Vec<String>,
    ) -> Self {
        Self {
            handler,
            settings: Arc::new(RwLock::new(settings)),
            supported_pairs: supported_pairs.into(),
        }
    }

    pub async fn settings(&self) -> BotSettings {
        self.settings.read().await.clone()
    }

    /// Run one command line and return the replies in the order they were sent.
    ///
    /// Unknown keys never reach the handler. Handler errors are returned as-is.
    pub async fn dispatch(&self, text: &str) -> Result<Vec<String>> {
        let key = command_key(text);
        match Operation::from_key(&key) {
            Some(op) => self.invoke(op, text).await,
            None => {
                debug!("Unhandled command key '{}'", key);
                let mut sink = MessageBuffer::new();
                sink.send_message(DASHBOARD_DESTINATION, UNHANDLED_REPLY);
                Ok(sink.into_messages())
            }
        }
    }

    /// The last message produced by a status call, or `""` if it sent none.
    pub async fn status_message(&self) -> Result<String> {
        let messages = self.invoke(Operation::Status, "/status").await?;
        Ok(messages.into_iter().last().unwrap_or_default())
    }

    async fn invoke(&self, op: Operation, text: &str) -> Result<Vec<String>> {
        // Snapshot so no lock is held while the handler runs.
        let settings = self.settings().await;
        let ctx = CommandContext {
            text,
            destination: DASHBOARD_DESTINATION,
            settings: &settings,
            supported_pairs: &self.supported_pairs,
        };
        let mut sink = MessageBuffer::new();
        let handler = self.handler.as_ref();

        info!("Dispatching {} command", op.name());
        match op {
            Operation::Status => handler.status(ctx, &mut sink).await?,
            Operation::ClosePosition => handler.close_position(ctx, &mut sink).await?,
            Operation::ApplySettings => {
                if let Some(updated) = handler.apply_settings(ctx, &mut sink).await? {
                    self.replace_settings(updated).await;
                }
            }
            Operation::AddRecipient => handler.add_recipient(ctx, &mut sink).await?,
            Operation::RemoveRecipient => handler.remove_recipient(ctx, &mut sink).await?,
            Operation::ListRecipients => handler.list_recipients(ctx, &mut sink).await?,
            Operation::Pause => handler.pause(ctx, &mut sink).await?,
            Operation::Resume => handler.resume(ctx, &mut sink).await?,
            Operation::ProfitToday => handler.profit_today(ctx, &mut sink).await?,
        }

        Ok(sink.into_messages())
    }

    /// The only place bot settings change.
    async fn replace_settings(&self, updated: BotSettings) {
        let mut current = self.settings.write().await;
        if *current != updated {
            info!("Bot settings updated: {:?} -> {:?}", *current, updated);
            *current = updated;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::*;

    /// Scripted handler: records each call and answers with canned replies.
    #[derive(Default)]
    pub struct FakeHandler {
        pub calls: Mutex<Vec<(String, String)>>,
        pub status_replies: Vec<String>,
        pub settings_update: Option<BotSettings>,
        pub fail_with: Option<String>,
    }

    impl FakeHandler {
        fn record(&self, op: &str, ctx: CommandContext<'_>) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((op.to_string(), ctx.text.to_string()));
            match &self.fail_with {
                Some(msg) => Err(anyhow!(msg.clone())),
                None => Ok(()),
            }
        }

        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandHandler for FakeHandler {
        async fn status(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()> {
            self.record("status", ctx)?;
            for reply in &self.status_replies {
                sink.send_message(ctx.destination, reply);
            }
            Ok(())
        }

        async fn close_position(
            &self,
            ctx: CommandContext<'_>,
            sink: &mut dyn ReplySink,
        ) -> Result<()> {
            self.record("close-position", ctx)?;
            let symbol = ctx.text.split_whitespace().nth(1).unwrap_or("?");
            sink.send_message(ctx.destination, &format!("Closing {symbol}"));
            Ok(())
        }

        async fn apply_settings(
            &self,
            ctx: CommandContext<'_>,
            sink: &mut dyn ReplySink,
        ) -> Result<Option<BotSettings>> {
            self.record("apply-settings", ctx)?;
            sink.send_message(
                ctx.destination,
                &format!("news was {}", ctx.settings.is_news_enabled),
            );
            Ok(self.settings_update.clone())
        }

        async fn add_recipient(
            &self,
            ctx: CommandContext<'_>,
            _sink: &mut dyn ReplySink,
        ) -> Result<()> {
            self.record("add-recipient", ctx)
        }

        async fn remove_recipient(
            &self,
            ctx: CommandContext<'_>,
            _sink: &mut dyn ReplySink,
        ) -> Result<()> {
            self.record("remove-recipient", ctx)
        }

        async fn list_recipients(
            &self,
            ctx: CommandContext<'_>,
            sink: &mut dyn ReplySink,
        ) -> Result<()> {
            self.record("list-recipients", ctx)?;
            sink.send_message(ctx.destination, &ctx.supported_pairs.join(","));
            Ok(())
        }

        async fn pause(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()> {
            self.record("pause", ctx)?;
            sink.send_message(ctx.destination, "Paused");
            Ok(())
        }

        async fn resume(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()> {
            self.record("resume", ctx)?;
            sink.send_message(ctx.destination, "Resumed");
            Ok(())
        }

        async fn profit_today(
            &self,
            ctx: CommandContext<'_>,
            _sink: &mut dyn ReplySink,
        ) -> Result<()> {
            self.record("profit-today", ctx)
        }
    }
}
