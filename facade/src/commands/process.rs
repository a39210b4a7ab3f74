//! Command handler that lives in a separate executable.
//!
//! Each operation spawns `<program> <operation-name>`, writes one JSON request
//! to its stdin and reads one JSON reply from its stdout:
//!
//! ```text
//! stdin:  {"operation":"close-position","text":"/cls EURUSD","destination":"dashboard",
//!          "settings":{"isNewsEnabled":false},"supportedPairs":["EURUSD"]}
//! stdout: {"messages":["Closed EURUSD"],"settings":null}
//! ```

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::handler::{BotSettings, CommandContext, CommandHandler, ReplySink};
use super::Operation;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    operation: &'static str,
    text: &'a str,
    destination: &'a str,
    settings: &'a BotSettings,
    supported_pairs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ProcessReply {
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    settings: Option<BotSettings>,
}

/// Runs every operation through an external program.
#[derive(Debug, Clone)]
pub struct ProcessCommandHandler {
    program: PathBuf,
}

impl ProcessCommandHandler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Spawn the program for one operation, forward its messages to `sink`
    /// and return any settings it reported.
    async fn run(
        &self,
        op: Operation,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<Option<BotSettings>> {
        let request = serde_json::to_vec(&ProcessRequest {
            operation: op.name(),
            text: ctx.text,
            destination: ctx.destination,
            settings: ctx.settings,
            supported_pairs: ctx.supported_pairs,
        })?;

        let mut child = tokio::process::Command::new(&self.program)
            .arg(op.name())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.program.display()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("command handler stdin unavailable"))?;
        // Feed stdin while stdout/stderr are drained, so neither side can block the other.
        let feed = async move {
            let written = stdin.write_all(&request).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.context("Failed to wait for command handler")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            warn!("{} {} exited with {}", self.program.display(), op.name(), output.status);
            if stderr.is_empty() {
                bail!("{} failed with {}", op.name(), output.status);
            }
            bail!("{}", stderr);
        }

        match written {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{} exited without reading its request", op.name());
            }
            Err(e) => return Err(e).context("Failed to write command request"),
        }

        let reply: ProcessReply = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Invalid reply from command handler for {}", op.name()))?;
        debug!("{} returned {} message(s)", op.name(), reply.messages.len());

        for message in &reply.messages {
            sink.send_message(ctx.destination, message);
        }
        Ok(reply.settings)
    }
}

#[async_trait]
impl CommandHandler for ProcessCommandHandler {
    async fn status(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()> {
        self.run(Operation::Status, ctx, sink).await.map(drop)
    }

    async fn close_position(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        self.run(Operation::ClosePosition, ctx, sink).await.map(drop)
    }

    async fn apply_settings(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<Option<BotSettings>> {
        self.run(Operation::ApplySettings, ctx, sink).await
    }

    async fn add_recipient(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        self.run(Operation::AddRecipient, ctx, sink).await.map(drop)
    }

    async fn remove_recipient(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        self.run(Operation::RemoveRecipient, ctx, sink).await.map(drop)
    }

    async fn list_recipients(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        self.run(Operation::ListRecipients, ctx, sink).await.map(drop)
    }

    async fn pause(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()> {
        self.run(Operation::Pause, ctx, sink).await.map(drop)
    }

    async fn resume(&self, ctx: CommandContext<'_>, sink: &mut dyn ReplySink) -> Result<()> {
        self.run(Operation::Resume, ctx, sink).await.map(drop)
    }

    async fn profit_today(
        &self,
        ctx: CommandContext<'_>,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        self.run(Operation::ProfitToday, ctx, sink).await.map(drop)
    }
}

/// Stand-in used when no handler program is configured: every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedHandler;

const NOT_CONFIGURED: &str = "command handler not configured (set COMMAND_HANDLER_BIN)";

#[async_trait]
impl CommandHandler for DisconnectedHandler {
    async fn status(&self, _ctx: CommandContext<'_>, _sink: &mut dyn ReplySink) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn close_position(
        &self,
        _ctx: CommandContext<'_>,
        _sink: &mut dyn ReplySink,
    ) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn apply_settings(
        &self,
        _ctx: CommandContext<'_>,
        _sink: &mut dyn ReplySink,
    ) -> Result<Option<BotSettings>> {
        bail!(NOT_CONFIGURED)
    }

    async fn add_recipient(
        &self,
        _ctx: CommandContext<'_>,
        _sink: &mut dyn ReplySink,
    ) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn remove_recipient(
        &self,
        _ctx: CommandContext<'_>,
        _sink: &mut dyn ReplySink,
    ) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn list_recipients(
        &self,
        _ctx: CommandContext<'_>,
        _sink: &mut dyn ReplySink,
    ) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn pause(&self, _ctx: CommandContext<'_>, _sink: &mut dyn ReplySink) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn resume(&self, _ctx: CommandContext<'_>, _sink: &mut dyn ReplySink) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }

    async fn profit_today(
        &self,
        _ctx: CommandContext<'_>,
        _sink: &mut dyn ReplySink,
    ) -> Result<()> {
        bail!(NOT_CONFIGURED)
    }
}
