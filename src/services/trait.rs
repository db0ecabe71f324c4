use tokio_util::sync::CancellationToken;

/// Trait for monitor loops that run as independently cancellable tasks.
#[async_trait::async_trait]
pub trait MonitorTask: Send {
    /// Run the loop until the token is cancelled or the event source closes.
    async fn run(self: Box<Self>, token: CancellationToken);
}
