use crate::events::PointerPosition;
use crate::services::engine::EngineShared;
use crate::services::MonitorTask;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Event-driven consumer of absolute pointer positions. Latches the shared
/// pointer-activity flag when displacement on either axis exceeds the
/// threshold; the keystroke loop consumes the flag at commit time.
pub struct PointerActivityMonitor {
    shared: Arc<EngineShared>,
    positions: mpsc::Receiver<PointerPosition>,
    threshold: i32,
    last_position: PointerPosition,
}

impl PointerActivityMonitor {
    pub fn new(
        shared: Arc<EngineShared>,
        positions: mpsc::Receiver<PointerPosition>,
        threshold: i32,
    ) -> Self {
        Self {
            shared,
            positions,
            threshold,
            last_position: PointerPosition::default(),
        }
    }

    pub async fn run(mut self, token: CancellationToken) {
        info!(
            "Pointer activity monitor started (threshold {} units)",
            self.threshold
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                position = self.positions.recv() => match position {
                    Some(position) => self.handle_position(position),
                    None => {
                        debug!("Pointer position source closed");
                        break;
                    }
                }
            }
        }

        info!("Pointer activity monitor stopped");
    }

    fn handle_position(&mut self, position: PointerPosition) {
        if position.moved_beyond(&self.last_position, self.threshold) {
            debug!(
                "Significant pointer movement: {} -> {}",
                self.last_position, position
            );
            self.shared.flag_pointer_moved();
            self.last_position = position;
        }
    }
}

#[async_trait::async_trait]
impl MonitorTask for PointerActivityMonitor {
    async fn run(self: Box<Self>, token: CancellationToken) {
        (*self).run(token).await;
    }
}
