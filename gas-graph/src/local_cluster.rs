/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! An in-process simulation of a cluster of machines, used by tests and
//! examples to exercise [`SyncEngine`](../gas_engine/engine/struct.SyncEngine.html)
//! without a real network layer.
//!
//! **This is a reference/test double, not a production transport.** It
//! assumes every "machine" is a thread within one process, and uses
//! [`crossbeam_channel`] mailboxes plus a reusable [`std::sync::Barrier`] for
//! the full-cluster rendezvous.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use crossbeam_channel::{Receiver, Sender};

use crate::error::GraphError;
use crate::ids::ProcId;
use crate::rpc::{ChannelTag, RpcChannel, RpcSubstrate};

type BoxedBatch = Box<dyn Any + Send>;
type Mailbox = (Sender<BoxedBatch>, Receiver<BoxedBatch>);

struct ClusterInner {
    num_procs: usize,
    barrier: Barrier,
    channels: Mutex<HashMap<(ChannelTag, ProcId), Mailbox>>,
    reduce_or_scratch: Mutex<Vec<bool>>,
    reduce_sum_scratch: Mutex<Vec<u64>>,
}

/// One machine's handle onto a simulated cluster. Clone-free: each process
/// gets its own `LocalCluster` from [`LocalCluster::new`].
#[derive(Clone)]
pub struct LocalCluster {
    inner: Arc<ClusterInner>,
    local_proc: ProcId,
}

impl LocalCluster {
    /// Builds `num_procs` handles onto one simulated cluster, one per
    /// machine. All handles must be driven to completion (every collective
    /// call made in the same order) or the shared barrier will deadlock.
    pub fn new(num_procs: usize) -> Vec<LocalCluster> {
        assert!(num_procs > 0, "a cluster needs at least one process");
        let inner = Arc::new(ClusterInner {
            num_procs,
            barrier: Barrier::new(num_procs),
            channels: Mutex::new(HashMap::new()),
            reduce_or_scratch: Mutex::new(vec![false; num_procs]),
            reduce_sum_scratch: Mutex::new(vec![0; num_procs]),
        });
        (0..num_procs)
            .map(|p| LocalCluster {
                inner: inner.clone(),
                local_proc: ProcId(p as u32),
            })
            .collect()
    }
}

impl RpcSubstrate for LocalCluster {
    fn proc_id(&self) -> ProcId {
        self.local_proc
    }

    fn num_procs(&self) -> usize {
        self.inner.num_procs
    }

    fn channel<T: Send + 'static>(&self, tag: ChannelTag) -> Box<dyn RpcChannel<T>> {
        Box::new(LocalChannel {
            inner: self.inner.clone(),
            tag,
            local_proc: self.local_proc,
            _marker: std::marker::PhantomData,
        })
    }

    fn full_barrier(&self) -> Result<(), GraphError> {
        self.inner.barrier.wait();
        Ok(())
    }

    fn all_reduce_or(&self, value: bool) -> Result<bool, GraphError> {
        self.inner.reduce_or_scratch.lock().unwrap()[self.local_proc.0 as usize] = value;
        self.inner.barrier.wait();
        let result = self.inner.reduce_or_scratch.lock().unwrap().iter().any(|&v| v);
        self.inner.barrier.wait();
        Ok(result)
    }

    fn all_reduce_sum(&self, value: u64) -> Result<u64, GraphError> {
        self.inner.reduce_sum_scratch.lock().unwrap()[self.local_proc.0 as usize] = value;
        self.inner.barrier.wait();
        let result = self.inner.reduce_sum_scratch.lock().unwrap().iter().sum();
        self.inner.barrier.wait();
        Ok(result)
    }
}

struct LocalChannel<T> {
    inner: Arc<ClusterInner>,
    tag: ChannelTag,
    local_proc: ProcId,
    _marker: std::marker::PhantomData<T>,
}

impl<T> LocalChannel<T> {
    fn mailbox_for(&self, owner: ProcId) -> Mailbox {
        self.inner
            .channels
            .lock()
            .unwrap()
            .entry((self.tag, owner))
            .or_insert_with(crossbeam_channel::unbounded)
            .clone()
    }
}

impl<T: Send + 'static> RpcChannel<T> for LocalChannel<T> {
    fn send(&self, dest: ProcId, batch: Vec<T>) -> Result<(), GraphError> {
        let (sender, _) = self.mailbox_for(dest);
        sender
            .send(Box::new(batch))
            .map_err(|e| GraphError::Transport(e.to_string()))
    }

    fn try_recv(&self) -> Option<Vec<T>> {
        let (_, receiver) = self.mailbox_for(self.local_proc);
        let boxed = receiver.try_recv().ok()?;
        Some(
            *boxed
                .downcast::<Vec<T>>()
                .expect("channel tag reused with a different payload type"),
        )
    }
}

// No `T` value is ever held directly (only boxed as `dyn Any` inside the
// shared mailboxes), so `LocalChannel<T>` is Send/Sync regardless of T.
unsafe impl<T> Send for LocalChannel<T> {}
unsafe impl<T> Sync for LocalChannel<T> {}
