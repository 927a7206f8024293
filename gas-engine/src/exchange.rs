/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A per-destination batching layer over an [`RpcChannel`] (`spec.md` §4.3).
//!
//! `send` is safe to call concurrently from any worker thread; `flush` and
//! `drain` are called only by the single thread coordinating a phase's
//! flush/barrier/drain handoff.

use std::sync::Mutex;

use gas_graph::error::GraphError;
use gas_graph::ids::ProcId;
use gas_graph::rpc::RpcChannel;

/// Buffers `(K, V)` pairs per destination process and flushes them as whole
/// batches through an [`RpcChannel`].
pub struct BufferedExchange<K, V> {
    channel: Box<dyn RpcChannel<(K, V)>>,
    buffers: Vec<Mutex<Vec<(K, V)>>>,
    buffer_limit: usize,
}

impl<K: Send + 'static, V: Send + 'static> BufferedExchange<K, V> {
    pub fn new(channel: Box<dyn RpcChannel<(K, V)>>, num_procs: usize, buffer_limit: usize) -> Self {
        Self {
            channel,
            buffers: (0..num_procs).map(|_| Mutex::new(Vec::new())).collect(),
            buffer_limit,
        }
    }

    /// Appends `(k, v)` to `dest`'s buffer, flushing eagerly if the buffer
    /// has grown past `buffer_limit`.
    pub fn send(&self, dest: ProcId, k: K, v: V) -> Result<(), GraphError> {
        let mut buffer = self.buffers[dest.0 as usize].lock().unwrap();
        buffer.push((k, v));
        if buffer.len() >= self.buffer_limit {
            let batch = std::mem::take(&mut *buffer);
            drop(buffer);
            self.channel.send(dest, batch)?;
        }
        Ok(())
    }

    /// Force-flushes every non-empty per-destination buffer. Must be called
    /// before the barrier that closes the phase this exchange belongs to.
    pub fn flush(&self) -> Result<(), GraphError> {
        for (dest, buffer) in self.buffers.iter().enumerate() {
            let batch = std::mem::take(&mut *buffer.lock().unwrap());
            if !batch.is_empty() {
                self.channel.send(ProcId(dest as u32), batch)?;
            }
        }
        Ok(())
    }

    /// Pulls one pending inbound batch into `out`, appending to whatever is
    /// already there. Returns `false` when no batch is currently available.
    pub fn drain(&self, out: &mut Vec<(K, V)>) -> bool {
        match self.channel.try_recv() {
            Some(mut batch) => {
                out.append(&mut batch);
                true
            }
            None => false,
        }
    }
}
