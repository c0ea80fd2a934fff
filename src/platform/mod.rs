pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Outbound half of the messaging platform, as seen by the feedback relay.
///
/// Implementations must be safe to share between the HTTP server and the
/// command dispatcher without extra locking.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Send one MarkdownV2-formatted message to a channel (numeric id or `@username`).
    async fn send_markdown(&self, channel: &str, text: &str) -> Result<()>;
}
