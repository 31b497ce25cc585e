use async_trait::async_trait;

/// A destination that receives formatted extraction output.
///
/// Implementations are expected to treat an unset/unconfigured destination as
/// a successful no-op rather than an error.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sink name used in logs and failure messages (e.g. "Mattermost").
    fn name(&self) -> &str;

    /// Deliver one formatted Markdown message.
    async fn deliver(&self, text: &str) -> anyhow::Result<()>;
}
