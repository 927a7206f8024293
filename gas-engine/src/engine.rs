/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The BSP driver: phase state machine, iteration loop, per-phase
//! exchanges, active-set bitsets, and termination (`spec.md` §4.5).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crossbeam_utils::CachePadded;
use log::{debug, info, warn};

use gas_graph::graph::DistributedGraph;
use gas_graph::ids::{EdgeDirection, GlobalId};
use gas_graph::program::{Context, EdgeRef, MessageRouter, VertexProgram};
use gas_graph::rpc::{ChannelKind, ChannelTag, RpcSubstrate};

use crate::atomic_add_vector::AtomicAddVector;
use crate::bitset::DenseBitset;
use crate::error::EngineError;
use crate::exchange::BufferedExchange;
use crate::options::EngineOptions;
use crate::status::ExecStatus;
use crate::vertex_program_store::VertexProgramStore;
use crate::workers::PhaseWorkers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Created,
    Initialized,
    Done,
}

/// Routes a [`Context::signal`] call through the engine's local fast path
/// (direct combine into `message_slot`) or the per-iteration message
/// exchange, and records the first routing fault so it survives even if the
/// calling vertex program discards the `Result`.
struct EngineMessageRouter<'a, G: DistributedGraph, M> {
    graph: &'a G,
    message_slot: &'a AtomicAddVector<M>,
    message_exchange: &'a BufferedExchange<GlobalId, M>,
    fault: &'a Mutex<Option<EngineError>>,
    /// Set whenever a signal takes the local fast path. The exchange-drain
    /// count alone understates how many messages are pending for the next
    /// iteration's P1: a local-to-local signal never touches the exchange,
    /// so quiescence detection must OR this in too.
    local_pending: &'a AtomicBool,
}

impl<'a, G: DistributedGraph, M: Clone + Send + 'static> MessageRouter<M>
    for EngineMessageRouter<'a, G, M>
{
    fn route(&mut self, target: GlobalId, msg: M) -> Result<(), gas_graph::error::GraphError> {
        let result = match self.graph.to_local(target) {
            Some(local) if self.graph.is_master(local) => {
                self.message_slot.add(local, msg);
                self.local_pending.store(true, Ordering::Relaxed);
                Ok(())
            }
            _ => match self.graph.master_of(target) {
                Some(owner) => self.message_exchange.send(owner, target, msg),
                None => Err(gas_graph::error::GraphError::UnknownVertex(target)),
            },
        };
        if let Err(ref e) = result {
            let mut fault = self.fault.lock().unwrap();
            if fault.is_none() {
                *fault = Some(EngineError::UserProgramFault(e.to_string()));
            }
        }
        result
    }
}

/// The distributed, synchronous GAS execution driver.
///
/// `R` is the RPC substrate, `G` the distributed graph partition, `P` the
/// user vertex program. One `SyncEngine` instance exists per machine; all
/// machines must drive it through the same sequence of collective calls
/// (`spec.md` §6).
pub struct SyncEngine<R: RpcSubstrate, G: DistributedGraph, P: VertexProgram<VertexData = G::VertexData>> {
    rpc: R,
    graph: G,
    program_template: P,
    options: EngineOptions,
    workers: PhaseWorkers,
    state: EngineState,

    program_store: Option<VertexProgramStore<P>>,
    message_slot: Option<AtomicAddVector<P::Message>>,
    gather_slot: Option<AtomicAddVector<P::Gather>>,
    active: Option<DenseBitset>,
    active_next: Option<DenseBitset>,

    iteration: usize,
    status: ExecStatus,
    /// Incremented by every worker thread's `apply` call in P3; padded so
    /// that hot concurrent `fetch_add`s don't false-share a cache line with
    /// neighboring fields.
    completed_tasks: CachePadded<AtomicU64>,
    last_update_count: u64,
    stop_requested: Arc<AtomicBool>,
    started_at: Option<Instant>,
}

impl<R, G, P> SyncEngine<R, G, P>
where
    R: RpcSubstrate,
    G: DistributedGraph,
    P: VertexProgram<VertexData = G::VertexData>,
{
    /// Constructs the engine. Collective: every machine must call this (and
    /// every other collective operation below) in the same order.
    pub fn new(rpc: R, graph: G, program_template: P, ncpus: usize) -> Self {
        Self {
            rpc,
            graph,
            program_template,
            options: EngineOptions::default(),
            workers: PhaseWorkers::new(ncpus.max(1)),
            state: EngineState::Created,
            program_store: None,
            message_slot: None,
            gather_slot: None,
            active: None,
            active_next: None,
            iteration: 0,
            status: ExecStatus::Unset,
            completed_tasks: CachePadded::new(AtomicU64::new(0)),
            last_update_count: 0,
            stop_requested: Arc::new(AtomicBool::new(false)),
            started_at: None,
        }
    }

    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
    }

    pub fn status(&self) -> ExecStatus {
        self.status
    }

    /// Read-only access to the graph partition, for inspecting results
    /// after `run()` returns.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Finalizes the graph and sizes the per-vertex structures. Collective;
    /// must be called exactly once, before `run()`.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        assert_eq!(self.state, EngineState::Created, "initialize() called twice");
        let n = self.graph.num_local_vertices();
        self.program_store = Some(VertexProgramStore::new(n, self.program_template.clone()));
        self.message_slot = Some(AtomicAddVector::new(n));
        self.gather_slot = Some(AtomicAddVector::new(n));
        self.active = Some(DenseBitset::new(n));
        self.active_next = Some(DenseBitset::new(n));

        self.init_phase()?;
        self.rpc.full_barrier()?;
        self.state = EngineState::Initialized;
        info!(
            "gas-engine initialized on {} with {} local vertices, {} workers",
            self.rpc.proc_id(),
            n,
            self.workers.width()
        );
        Ok(())
    }

    /// Routes `msg` to the owner of `global_vid`. Legal before `run()`;
    /// queued for delivery at iteration 0's message receive.
    pub fn signal(&self, global_vid: GlobalId, msg: P::Message) -> Result<(), EngineError> {
        assert_eq!(
            self.state,
            EngineState::Initialized,
            "signal() requires initialize() to have run, and must be called before run()"
        );
        let message_slot = self.message_slot.as_ref().unwrap();
        let exchange = self.presignal_exchange();
        let fault = Mutex::new(None);
        let local_pending = AtomicBool::new(false);
        let mut router = EngineMessageRouter {
            graph: &self.graph,
            message_slot,
            message_exchange: &exchange,
            fault: &fault,
            local_pending: &local_pending,
        };
        router.route(global_vid, msg)?;
        exchange.flush()?;
        if let Some(f) = fault.into_inner().unwrap() {
            return Err(f);
        }
        Ok(())
    }

    /// Signals every local vertex with `msg`. Legal before `run()`.
    pub fn signal_all(&self, msg: P::Message) -> Result<(), EngineError>
    where
        P::Message: Clone,
    {
        for local in 0..self.graph.num_local_vertices() {
            self.signal(self.graph.to_global(local), msg.clone())?;
        }
        Ok(())
    }

    /// Requests cooperative termination; consulted at the top of each
    /// phase. Callable from any thread, concurrently with `run()`.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// A cloneable handle onto this engine's stop flag, so a caller can
    /// request termination from a thread that does not own the engine
    /// itself (which `run()` borrows exclusively for its duration).
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_requested.clone()
    }

    /// Total `apply` invocations across the cluster, valid once `run()` has
    /// returned.
    pub fn last_update_count(&self) -> u64 {
        self.last_update_count
    }

    fn exchange_for<K, V>(&self, kind: ChannelKind, iteration: usize) -> BufferedExchange<K, V>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        let tag = ChannelTag::new(kind, iteration);
        BufferedExchange::new(
            self.rpc.channel(tag),
            self.rpc.num_procs(),
            self.options.buffer_limit,
        )
    }

    /// The message exchange shared by `signal`/`signal_all` before `run()`
    /// and by `init_phase`, all destined for iteration 0's P1 receive.
    fn presignal_exchange(&self) -> BufferedExchange<GlobalId, P::Message> {
        self.exchange_for::<GlobalId, P::Message>(ChannelKind::Message, 0)
    }

    fn check_stop_or_timeout(&self) -> Option<ExecStatus> {
        if self.stop_requested.load(Ordering::SeqCst) {
            return Some(ExecStatus::ForcedAbort);
        }
        if let (Some(timeout), Some(started_at)) = (self.options.timeout, self.started_at) {
            if started_at.elapsed() >= timeout {
                return Some(ExecStatus::Timeout);
            }
        }
        None
    }

    /// Striped over local masters: `program[l].init(ctx, vertex_ref(l))`,
    /// then broadcast the initialized program to mirrors. `active_next` is
    /// explicitly cleared afterwards so init alone never activates a
    /// vertex.
    fn init_phase(&self) -> Result<(), EngineError> {
        let vprog_exchange = self.exchange_for::<GlobalId, P>(ChannelKind::Program, 0);
        let presignal_exchange = self.presignal_exchange();
        let fault: Mutex<Option<EngineError>> = Mutex::new(None);
        let local_pending = AtomicBool::new(false);
        let program_store = self.program_store.as_ref().unwrap();
        let message_slot = self.message_slot.as_ref().unwrap();

        self.workers.run_phase(|thread_id, width, barrier| {
            let mut l = thread_id;
            while l < self.graph.num_local_vertices() {
                if self.graph.is_master(l) {
                    let mut program = program_store.get(l);
                    let mut vertex = self.graph.vertex_data(l);
                    let mut router = EngineMessageRouter {
                        graph: &self.graph,
                        message_slot,
                        message_exchange: &presignal_exchange,
                        fault: &fault,
                        local_pending: &local_pending,
                    };
                    let mut ctx = Context::new(&mut router, 0);
                    program.init(&mut ctx, &mut vertex);
                    self.graph.set_vertex_data(l, vertex);
                    program_store.set(l, program.clone());

                    for &mirror in self.graph.mirrors_of(l) {
                        if let Err(e) = vprog_exchange.send(mirror, self.graph.to_global(l), program.clone()) {
                            let mut f = fault.lock().unwrap();
                            if f.is_none() {
                                *f = Some(EngineError::from(e));
                            }
                        }
                    }
                }
                l += width;
            }
            barrier.wait();
        });

        vprog_exchange.flush()?;
        presignal_exchange.flush()?;
        self.rpc.full_barrier()?;

        let mut inbound = Vec::new();
        while vprog_exchange.drain(&mut inbound) {}
        for (global, payload) in inbound {
            if let Some(local) = self.graph.to_local(global) {
                program_store.set(local, payload);
            }
        }

        self.active_next.as_ref().unwrap().clear_all(Ordering::SeqCst);
        if let Some(f) = fault.into_inner().unwrap() {
            return Err(f);
        }
        Ok(())
    }

    /// Drains whatever `signal`/`signal_all` (or `init`, if it disregarded
    /// the "must not signal" contract) queued before `run()` began, into
    /// local masters' `message_slot`.
    fn drain_presignals(&self) -> Result<(), EngineError> {
        let exchange = self.presignal_exchange();
        self.rpc.full_barrier()?;
        let mut inbound = Vec::new();
        while exchange.drain(&mut inbound) {}
        let message_slot = self.message_slot.as_ref().unwrap();
        for (global, msg) in inbound {
            if let Some(local) = self.graph.to_local(global) {
                message_slot.add(local, msg);
            } else {
                warn!("dropped a pre-run signal addressed to an unknown vertex {global}");
            }
        }
        Ok(())
    }

    /// Drives the engine to completion: collective, blocking. `spec.md` §6.
    pub fn run(&mut self) -> Result<ExecStatus, EngineError> {
        assert_eq!(self.state, EngineState::Initialized, "run() requires initialize()");
        self.started_at = Some(Instant::now());
        self.drain_presignals()?;

        loop {
            if let Some(status) = self.check_stop_or_timeout() {
                self.rpc.full_barrier()?;
                self.finish(status)?;
                return Ok(status);
            }

            debug!("{} entering iteration {}", self.rpc.proc_id(), self.iteration);

            // The message exchange is shared across all four phases of this
            // iteration: a signal produced anywhere in iteration `k` is
            // destined for iteration `k + 1`'s P1, and is flushed/drained
            // only once, at P4's mid-phase barrier.
            let message_exchange =
                self.exchange_for::<GlobalId, P::Message>(ChannelKind::Message, self.iteration + 1);
            // Tracks whether any signal this iteration took the local fast
            // path straight into `message_slot`, bypassing the exchange
            // entirely; the exchange's drain count alone would miss it.
            let local_pending = AtomicBool::new(false);

            if let Err(e) = self.phase_p1_recv_and_activate(&message_exchange, &local_pending) {
                self.rpc.full_barrier()?;
                self.finish(ExecStatus::ForcedAbort)?;
                return Err(e);
            }

            if let Some(status) = self.check_stop_or_timeout() {
                self.rpc.full_barrier()?;
                self.finish(status)?;
                return Ok(status);
            }
            if let Err(e) = self.phase_p2_gather() {
                self.rpc.full_barrier()?;
                self.finish(ExecStatus::ForcedAbort)?;
                return Err(e);
            }

            if let Some(status) = self.check_stop_or_timeout() {
                self.rpc.full_barrier()?;
                self.finish(status)?;
                return Ok(status);
            }
            if let Err(e) = self.phase_p3_apply_and_broadcast(&message_exchange, &local_pending) {
                self.rpc.full_barrier()?;
                self.finish(ExecStatus::ForcedAbort)?;
                return Err(e);
            }

            if let Some(status) = self.check_stop_or_timeout() {
                self.rpc.full_barrier()?;
                self.finish(status)?;
                return Ok(status);
            }
            let any_messages_pending = match self.phase_p4_scatter(&message_exchange, &local_pending) {
                Ok(pending) => pending,
                Err(e) => {
                    self.rpc.full_barrier()?;
                    self.finish(ExecStatus::ForcedAbort)?;
                    return Err(e);
                }
            };

            self.rpc.full_barrier()?;

            let is_last = self
                .options
                .max_iterations
                .map(|max| self.iteration + 1 >= max)
                .unwrap_or(false);

            if !any_messages_pending {
                self.finish(ExecStatus::NoMoreTasks)?;
                return Ok(ExecStatus::NoMoreTasks);
            }
            if is_last {
                self.finish(ExecStatus::TaskBudgetExceeded)?;
                return Ok(ExecStatus::TaskBudgetExceeded);
            }

            self.active.as_ref().unwrap().clear_all(Ordering::SeqCst);
            self.active_next.as_ref().unwrap().clear_all(Ordering::SeqCst);
            self.iteration += 1;
        }
    }

    fn finish(&mut self, status: ExecStatus) -> Result<(), EngineError> {
        self.status = status;
        self.state = EngineState::Done;
        let local = self.completed_tasks.load(Ordering::SeqCst);
        self.last_update_count = self.rpc.all_reduce_sum(local)?;
        info!(
            "{} finished with status {:?} after {} local iterations, {} total applies",
            self.rpc.proc_id(),
            status,
            self.iteration + 1,
            self.last_update_count
        );
        Ok(())
    }

    /// P1. For each local master with a non-empty `message_slot`: deliver
    /// the message, activate, and (if the program still needs a gather)
    /// broadcast the current program to mirrors.
    fn phase_p1_recv_and_activate(
        &self,
        message_exchange: &BufferedExchange<GlobalId, P::Message>,
        local_pending: &AtomicBool,
    ) -> Result<(), EngineError> {
        let vprog_exchange = self.exchange_for::<GlobalId, P>(ChannelKind::Program, self.iteration);
        let fault: Mutex<Option<EngineError>> = Mutex::new(None);
        let program_store = self.program_store.as_ref().unwrap();
        let message_slot = self.message_slot.as_ref().unwrap();
        let active = self.active.as_ref().unwrap();
        let active_next = self.active_next.as_ref().unwrap();
        let gather_slot = self.gather_slot.as_ref().unwrap();

        self.workers.run_phase(|thread_id, width, barrier| {
            let mut l = thread_id;
            while l < self.graph.num_local_vertices() {
                if self.graph.is_master(l) {
                    let mut msg = None;
                    if message_slot.test_and_get(l, &mut msg) {
                        active.set_bit(l, Ordering::SeqCst);
                        let mut program = program_store.get(l);
                        let mut vertex = self.graph.vertex_data(l);
                        let mut router = EngineMessageRouter {
                            graph: &self.graph,
                            message_slot,
                            message_exchange,
                            fault: &fault,
                            local_pending,
                        };
                        let mut ctx = Context::new(&mut router, self.iteration);
                        program.recv_message(&mut ctx, &mut vertex, msg.unwrap());
                        self.graph.set_vertex_data(l, vertex);
                        program_store.set(l, program.clone());

                        if program.gather_edges() != EdgeDirection::None && gather_slot.empty(l) {
                            active_next.set_bit(l, Ordering::SeqCst);
                            for &mirror in self.graph.mirrors_of(l) {
                                if let Err(e) =
                                    vprog_exchange.send(mirror, self.graph.to_global(l), program.clone())
                                {
                                    let mut f = fault.lock().unwrap();
                                    if f.is_none() {
                                        *f = Some(EngineError::from(e));
                                    }
                                }
                            }
                        }
                    }
                }
                l += width;
            }
            barrier.wait();
        });

        vprog_exchange.flush()?;
        self.rpc.full_barrier()?;

        let mut inbound = Vec::new();
        while vprog_exchange.drain(&mut inbound) {}
        for (global, payload) in inbound {
            if let Some(local) = self.graph.to_local(global) {
                program_store.set(local, payload);
                active_next.set_bit(local, Ordering::SeqCst);
            }
        }

        if let Some(f) = fault.into_inner().unwrap() {
            return Err(f);
        }
        Ok(())
    }

    /// P2. Striped over vertices with `active_next` set: fold edge
    /// contributions into `gather_slot`; mirrors forward their partial to
    /// the owning master.
    fn phase_p2_gather(&self) -> Result<(), EngineError> {
        let gather_partials = self.exchange_for::<GlobalId, P::Gather>(ChannelKind::GatherPartial, self.iteration);
        let fault: Mutex<Option<EngineError>> = Mutex::new(None);
        let program_store = self.program_store.as_ref().unwrap();
        let gather_slot = self.gather_slot.as_ref().unwrap();
        let active_next = self.active_next.as_ref().unwrap();
        let use_cache = self.options.use_gather_cache;

        self.workers.run_phase(|thread_id, width, barrier| {
            let mut l = thread_id;
            while l < self.graph.num_local_vertices() {
                if active_next.get(l, Ordering::SeqCst) {
                    if !(use_cache && !gather_slot.empty(l)) {
                        let program = program_store.get(l);
                        let direction = program.gather_edges();
                        if direction != EdgeDirection::None {
                            let vertex = self.graph.vertex_data(l);
                            for neighbor_local in self.graph.edges(l, direction) {
                                let edge = EdgeRef {
                                    neighbor: self.graph.to_global(neighbor_local),
                                    neighbor_data: self.graph.vertex_data(neighbor_local),
                                    direction,
                                };
                                let partial = program.gather(&vertex, edge);
                                gather_slot.add(l, partial);
                            }
                        }
                    }
                    if !self.graph.is_master(l) {
                        let mut partial = None;
                        if gather_slot.test_and_get(l, &mut partial) {
                            if let Some(owner) = self.graph.master_of(self.graph.to_global(l)) {
                                if let Err(e) =
                                    gather_partials.send(owner, self.graph.to_global(l), partial.unwrap())
                                {
                                    let mut f = fault.lock().unwrap();
                                    if f.is_none() {
                                        *f = Some(EngineError::from(e));
                                    }
                                }
                            }
                        }
                    }
                }
                l += width;
            }
            barrier.wait();
        });

        gather_partials.flush()?;
        self.rpc.full_barrier()?;

        let mut inbound = Vec::new();
        while gather_partials.drain(&mut inbound) {}
        for (global, partial) in inbound {
            if let Some(local) = self.graph.to_local(global) {
                gather_slot.add(local, partial);
            }
        }

        if let Some(f) = fault.into_inner().unwrap() {
            return Err(f);
        }
        Ok(())
    }

    /// P3. For each local master with `active` set: apply the gathered
    /// result and broadcast the updated vertex data to mirrors.
    fn phase_p3_apply_and_broadcast(
        &self,
        message_exchange: &BufferedExchange<GlobalId, P::Message>,
        local_pending: &AtomicBool,
    ) -> Result<(), EngineError> {
        let vdata_exchange = self.exchange_for::<GlobalId, P::VertexData>(ChannelKind::VertexData, self.iteration);
        let fault: Mutex<Option<EngineError>> = Mutex::new(None);
        let program_store = self.program_store.as_ref().unwrap();
        let gather_slot = self.gather_slot.as_ref().unwrap();
        let active = self.active.as_ref().unwrap();
        let message_slot = self.message_slot.as_ref().unwrap();

        self.workers.run_phase(|thread_id, width, barrier| {
            let mut l = thread_id;
            while l < self.graph.num_local_vertices() {
                if self.graph.is_master(l) && active.get(l, Ordering::SeqCst) {
                    let mut gathered = None;
                    gather_slot.test_and_get(l, &mut gathered);

                    let mut program = program_store.get(l);
                    let mut vertex = self.graph.vertex_data(l);
                    let mut router = EngineMessageRouter {
                        graph: &self.graph,
                        message_slot,
                        message_exchange,
                        fault: &fault,
                        local_pending,
                    };
                    let mut ctx = Context::new(&mut router, self.iteration);
                    program.apply(&mut ctx, &mut vertex, gathered);
                    self.graph.set_vertex_data(l, vertex.clone());
                    program_store.set(l, program);

                    self.completed_tasks.fetch_add(1, Ordering::SeqCst);

                    for &mirror in self.graph.mirrors_of(l) {
                        if let Err(e) = vdata_exchange.send(mirror, self.graph.to_global(l), vertex.clone()) {
                            let mut f = fault.lock().unwrap();
                            if f.is_none() {
                                *f = Some(EngineError::from(e));
                            }
                        }
                    }
                }
                l += width;
            }
            barrier.wait();
        });

        vdata_exchange.flush()?;
        self.rpc.full_barrier()?;

        let mut inbound = Vec::new();
        while vdata_exchange.drain(&mut inbound) {}
        for (global, payload) in inbound {
            if let Some(local) = self.graph.to_local(global) {
                self.graph.set_vertex_data(local, payload);
            }
        }

        if let Some(f) = fault.into_inner().unwrap() {
            return Err(f);
        }
        Ok(())
    }

    /// P4. For each local vertex with `active_next` set: scatter along its
    /// edges, possibly signaling neighbors. Returns whether any message is
    /// pending for the next iteration, cluster-wide.
    fn phase_p4_scatter(
        &self,
        message_exchange: &BufferedExchange<GlobalId, P::Message>,
        local_pending: &AtomicBool,
    ) -> Result<bool, EngineError> {
        let fault: Mutex<Option<EngineError>> = Mutex::new(None);
        let program_store = self.program_store.as_ref().unwrap();
        let active_next = self.active_next.as_ref().unwrap();
        let message_slot = self.message_slot.as_ref().unwrap();

        self.workers.run_phase(|thread_id, width, barrier| {
            let mut l = thread_id;
            while l < self.graph.num_local_vertices() {
                if active_next.get(l, Ordering::SeqCst) {
                    let program = program_store.get(l);
                    let direction = program.scatter_edges();
                    if direction != EdgeDirection::None {
                        let vertex = self.graph.vertex_data(l);
                        for neighbor_local in self.graph.edges(l, direction) {
                            let edge = EdgeRef {
                                neighbor: self.graph.to_global(neighbor_local),
                                neighbor_data: self.graph.vertex_data(neighbor_local),
                                direction,
                            };
                            let mut router = EngineMessageRouter {
                                graph: &self.graph,
                                message_slot,
                                message_exchange,
                                fault: &fault,
                                local_pending,
                            };
                            let mut ctx = Context::new(&mut router, self.iteration);
                            program.scatter(&mut ctx, &vertex, edge);
                        }
                    }
                }
                l += width;
            }
            barrier.wait();
        });

        message_exchange.flush()?;
        self.rpc.full_barrier()?;

        let mut inbound = Vec::new();
        while message_exchange.drain(&mut inbound) {}
        let any_local = !inbound.is_empty() || local_pending.load(Ordering::Relaxed);
        for (global, msg) in inbound {
            if let Some(local) = self.graph.to_local(global) {
                message_slot.add(local, msg);
            } else {
                warn!("dropped a message addressed to an unknown vertex {global}");
            }
        }

        if let Some(f) = fault.into_inner().unwrap() {
            return Err(f);
        }
        let global_any = self.rpc.all_reduce_or(any_local)?;
        Ok(global_any)
    }
}
