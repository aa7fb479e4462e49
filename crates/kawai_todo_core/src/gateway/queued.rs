//! Background writer that makes saves fire-and-forget.
//!
//! # Responsibility
//! - Move storage writes off the caller's thread.
//! - Offer `flush()` for callers that need deterministic persistence timing.
//!
//! # Invariants
//! - One writer thread consumes one FIFO queue, so saves land in issue order.
//! - `load` and `flush` are queued behind every earlier save.
//! - Dropping the gateway drains pending saves before the writer exits.

use super::{GatewayError, GatewayResult, PersistenceGateway};
use log::{error, info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

const WRITER_THREAD_NAME: &str = "kawai-todo-writer";

enum Command {
    Save(String),
    Load(Sender<GatewayResult<Option<String>>>),
    Flush(Sender<()>),
}

/// Gateway decorator that applies saves on a dedicated thread.
pub struct QueuedGateway {
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl QueuedGateway {
    /// Starts the writer thread that owns `inner`.
    ///
    /// # Errors
    /// - Returns `GatewayError::Io` when the thread cannot be spawned.
    pub fn spawn<G>(inner: G) -> GatewayResult<Self>
    where
        G: PersistenceGateway + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(inner, receiver))?;
        info!("event=writer_start module=gateway status=ok thread={WRITER_THREAD_NAME}");
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Blocks until every save issued before this call has been applied.
    pub fn flush(&self) -> GatewayResult<()> {
        let (ack_sender, ack_receiver) = mpsc::channel();
        self.send(Command::Flush(ack_sender))?;
        ack_receiver
            .recv()
            .map_err(|_| GatewayError::WorkerStopped)
    }

    fn send(&self, command: Command) -> GatewayResult<()> {
        let sender = self.sender.as_ref().ok_or(GatewayError::WorkerStopped)?;
        sender
            .send(command)
            .map_err(|_| GatewayError::WorkerStopped)
    }
}

impl PersistenceGateway for QueuedGateway {
    fn load(&self) -> GatewayResult<Option<String>> {
        let (reply_sender, reply_receiver) = mpsc::channel();
        self.send(Command::Load(reply_sender))?;
        reply_receiver
            .recv()
            .map_err(|_| GatewayError::WorkerStopped)?
    }

    /// Enqueues the blob and returns without waiting for storage.
    ///
    /// Storage failures surface in logs only, as `kv_save status=error`.
    fn save(&self, blob: &str) -> GatewayResult<()> {
        self.send(Command::Save(blob.to_string()))
    }
}

impl Drop for QueuedGateway {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=writer_stop module=gateway status=error error_code=writer_panicked");
            } else {
                info!("event=writer_stop module=gateway status=ok");
            }
        }
    }
}

fn run_writer<G: PersistenceGateway>(inner: G, receiver: Receiver<Command>) {
    for command in receiver {
        match command {
            Command::Save(blob) => {
                if let Err(err) = inner.save(&blob) {
                    error!(
                        "event=kv_save module=gateway status=error mode=queued error_code=save_failed error={err}"
                    );
                }
            }
            Command::Load(reply) => {
                if reply.send(inner.load()).is_err() {
                    warn!("event=kv_load module=gateway status=dropped mode=queued");
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QueuedGateway;
    use crate::gateway::{MemoryGateway, PersistenceGateway};
    use std::sync::Arc;

    #[test]
    fn flush_makes_latest_save_visible_to_inner_gateway() {
        let inner = Arc::new(MemoryGateway::new());
        let queued = QueuedGateway::spawn(Arc::clone(&inner)).unwrap();

        queued.save("{\"v\":1}").unwrap();
        queued.save("{\"v\":2}").unwrap();
        queued.save("{\"v\":3}").unwrap();
        queued.flush().unwrap();

        assert_eq!(inner.save_count(), 3);
        assert_eq!(inner.blob().as_deref(), Some("{\"v\":3}"));
    }

    #[test]
    fn load_observes_saves_queued_before_it() {
        let queued = QueuedGateway::spawn(MemoryGateway::new()).unwrap();
        assert_eq!(queued.load().unwrap(), None);

        queued.save("{}").unwrap();
        assert_eq!(queued.load().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn drop_drains_pending_saves() {
        let inner = Arc::new(MemoryGateway::new());
        {
            let queued = QueuedGateway::spawn(Arc::clone(&inner)).unwrap();
            for index in 0..50 {
                queued.save(&format!("{{\"n\":{index}}}")).unwrap();
            }
        }

        assert_eq!(inner.save_count(), 50);
        assert_eq!(inner.blob().as_deref(), Some("{\"n\":49}"));
    }

    #[test]
    fn inner_save_failure_does_not_stop_the_writer() {
        let inner = Arc::new(MemoryGateway::new());
        let queued = QueuedGateway::spawn(Arc::clone(&inner)).unwrap();

        inner.set_fail_saves(true);
        queued.save("lost").unwrap();
        queued.flush().unwrap();
        inner.set_fail_saves(false);
        queued.save("kept").unwrap();
        queued.flush().unwrap();

        assert_eq!(inner.blob().as_deref(), Some("kept"));
    }
}
