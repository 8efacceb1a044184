//! Coordinator/worker rendezvous primitives.
//!
//! Two synchronization points frame a run:
//!
//! 1. `work_channel` - the coordinator broadcasts the frozen work list once;
//!    every worker receives an identical shared copy before touching any
//!    item.
//! 2. `Rendezvous` - a full-stop barrier after the per-worker loops, so
//!    aggregation only begins once every worker has finished.

use std::sync::Arc;

use tokio::sync::{oneshot, Barrier};
use tracing::debug;

use contracts::{PipelineError, WorkItem, WorkerId};

/// Sending half of the one-shot work broadcast. Held by the coordinator.
pub struct WorkBroadcast {
    senders: Vec<oneshot::Sender<Arc<[WorkItem]>>>,
}

/// Receiving half, one per worker.
pub struct WorkReceiver {
    worker: WorkerId,
    receiver: oneshot::Receiver<Arc<[WorkItem]>>,
}

/// Create the broadcast pair for `size` workers.
pub fn work_channel(size: usize) -> (WorkBroadcast, Vec<WorkReceiver>) {
    let mut senders = Vec::with_capacity(size);
    let mut receivers = Vec::with_capacity(size);

    for w in 0..size {
        let (tx, rx) = oneshot::channel();
        senders.push(tx);
        receivers.push(WorkReceiver {
            worker: WorkerId(w),
            receiver: rx,
        });
    }

    (WorkBroadcast { senders }, receivers)
}

impl WorkBroadcast {
    /// Send the frozen list to every worker. Consumes the broadcast: the
    /// list goes out exactly once.
    ///
    /// A worker that already dropped its receiver is skipped; it will report
    /// its own failure through the join handle instead.
    pub fn broadcast(self, items: Arc<[WorkItem]>) {
        debug!(
            items = items.len(),
            workers = self.senders.len(),
            "broadcasting work list"
        );
        for sender in self.senders {
            let _ = sender.send(Arc::clone(&items));
        }
    }
}

impl WorkReceiver {
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Wait for the coordinator's list.
    pub async fn recv(self) -> Result<Arc<[WorkItem]>, PipelineError> {
        self.receiver.await.map_err(|_| {
            PipelineError::Other(format!(
                "worker {}: coordinator dropped before broadcasting work",
                self.worker
            ))
        })
    }
}

/// Barrier every worker and the coordinator arrive at after the dispatch
/// loops. Cloneable handle; parties = workers + 1.
#[derive(Clone)]
pub struct Rendezvous {
    barrier: Arc<Barrier>,
}

impl Rendezvous {
    /// Barrier for `workers` worker tasks plus the coordinator.
    pub fn new(workers: usize) -> Self {
        Self {
            barrier: Arc::new(Barrier::new(workers + 1)),
        }
    }

    /// Park until all parties have arrived.
    pub async fn arrive(&self) {
        self.barrier.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ExpId, Flavor, Night};

    fn list() -> Arc<[WorkItem]> {
        vec![WorkItem {
            night: Night::parse("20200101").unwrap(),
            expid: ExpId(1),
            flavor: Flavor::Flat,
            simspec: "/raw/20200101/00000001/simspec-00000001.fits".into(),
        }]
        .into()
    }

    #[tokio::test]
    async fn every_worker_gets_the_same_list() {
        let (tx, receivers) = work_channel(3);
        tx.broadcast(list());

        let mut copies = Vec::new();
        for rx in receivers {
            copies.push(rx.recv().await.unwrap());
        }

        assert!(copies.iter().all(|c| Arc::ptr_eq(c, &copies[0])));
    }

    #[tokio::test]
    async fn dropped_coordinator_is_an_error() {
        let (tx, receivers) = work_channel(1);
        drop(tx);

        let rx = receivers.into_iter().next().unwrap();
        let err = rx.recv().await.unwrap_err();
        assert!(err.to_string().contains("coordinator dropped"));
    }

    #[tokio::test]
    async fn rendezvous_releases_all_parties() {
        let rendezvous = Rendezvous::new(2);

        let mut handles = Vec::new();
        for _ in 0..2 {
            let r = rendezvous.clone();
            handles.push(tokio::spawn(async move { r.arrive().await }));
        }

        rendezvous.arrive().await;
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
