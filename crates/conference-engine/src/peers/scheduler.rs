use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::{PeerResult, TerminationScheduler};

/// In-process delayed termination
///
/// Each scheduled conference gets a sleeping task that delivers the conference id on
/// the returned channel. Scheduling the same conference again replaces its timer.
pub struct LocalTerminationScheduler {
    tx: mpsc::UnboundedSender<Uuid>,
    timers: Arc<Mutex<HashMap<Uuid, (u64, JoinHandle<()>)>>>,
    generation: AtomicU64,
}

impl LocalTerminationScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Uuid>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            timers: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        };
        (scheduler, rx)
    }

    /// Number of timers still waiting
    pub fn pending(&self) -> usize {
        self.timers.lock().len()
    }

    /// Cancel every pending timer
    pub fn cancel_all(&self) {
        for (_, (_, handle)) in self.timers.lock().drain() {
            handle.abort();
        }
    }
}

#[async_trait]
impl TerminationScheduler for LocalTerminationScheduler {
    async fn schedule_termination(&self, conference_id: Uuid, delay: Duration) -> PeerResult<()> {
        info!("⏰ Scheduling termination of conference {} in {:?}", conference_id, delay);

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let tx = self.tx.clone();
        let timers = self.timers.clone();

        // the map lock is held until the handle is stored so the timer cannot outrun it
        let mut pending = self.timers.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut timers = timers.lock();
                if matches!(timers.get(&conference_id), Some((g, _)) if *g == generation) {
                    timers.remove(&conference_id);
                }
            }
            if tx.send(conference_id).is_err() {
                debug!("Termination consumer is gone, dropping timer of {}", conference_id);
            }
        });

        if let Some((_, previous)) = pending.insert(conference_id, (generation, handle)) {
            previous.abort();
        }
        Ok(())
    }

    async fn cancel_termination(&self, conference_id: Uuid) -> PeerResult<()> {
        if let Some((_, handle)) = self.timers.lock().remove(&conference_id) {
            handle.abort();
            debug!("Cancelled termination timer of conference {}", conference_id);
        }
        Ok(())
    }
}
