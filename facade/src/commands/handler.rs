use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime switches shared by every command invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSettings {
    #[serde(default)]
    pub is_news_enabled: bool,
    /// Switches this facade does not know about are carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Where command output goes. One is created per invocation.
pub trait ReplySink: Send {
    fn send_message(&mut self, destination: &str, text: &str);
}

/// Collects replies in the order they were sent.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    messages: Vec<String>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl ReplySink for MessageBuffer {
    fn send_message(&mut self, _destination: &str, text: &str) {
        self.messages.push(text.to_string());
    }
}

/// Everything an operation gets to see about the call.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// The full command line as typed, for operations that parse their own arguments.
    pub text: &'a str,
    pub destination: &'a str,
    pub settings: &'a BotSettings,
    pub supported_pairs: &'a [String],
}

/// The trading bot's native command interface.
///
/// Settings are read-only here; `apply_settings` hands back the new value
/// and the dispatcher decides whether to store it.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn status(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()>;

    async fn close_position(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink)
        -> Result<()>;

    async fn apply_settings(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<Option<BotSettings>>;

    async fn add_recipient(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink)
        -> Result<()>;

    async fn remove_recipient(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()>;

    async fn list_recipients(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()>;

    async fn pause(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()>;

    async fn resume(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()>;

    async fn profit_today(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink)
        -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_buffer_keeps_order() {
        let mut buf = MessageBuffer::new();
        buf.send_message("dashboard", "first");
        buf.send_message("dashboard", "second");
        assert_eq!(buf.into_messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_bot_settings_wire_shape() {
        let parsed: BotSettings =
            serde_json::from_value(json!({"isNewsEnabled": true, "riskMode": "tight"})).unwrap();
        assert!(parsed.is_news_enabled);
        assert_eq!(parsed.extra["riskMode"], "tight");
        assert_eq!(
            serde_json::to_value(&parsed).unwrap(),
            json!({"isNewsEnabled": true, "riskMode": "tight"})
        );
    }
}
