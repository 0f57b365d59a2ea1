//! Routed execution runtime for rafsim.
//!
//! `SimEngine` is synchronous and CPU-bound. A large saturation sweep can
//! take seconds, so this module provides a small, bounded, thread-based
//! runtime that routes requests into separate light and heavy worker pools.
//! Submission never blocks: a full queue is reported as `QueueFull`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::engine::SimEngine;
use crate::error::{ExecutionError, SimError, SimResult};
use crate::request::{GenerateRequest, ValidatedRequest};
use crate::response::GenerateResponse;

/// Worker pool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Small probes.
    Light,
    /// Large runs and sweeps.
    Heavy,
}

impl PoolKind {
    /// Pool name used in thread names and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Heavy => "heavy",
        }
    }
}

/// Routes requests to a pool.
pub trait RequestRouter: Send + Sync {
    /// Selects the pool for the given request.
    fn route(&self, request: &ValidatedRequest) -> PoolKind;
}

/// Routes by estimated cost (runs times total saturation).
#[derive(Debug, Clone, Copy)]
pub struct CostRouter {
    threshold: u64,
}

impl CostRouter {
    /// Requests costing more than `threshold` go to the heavy pool.
    #[must_use]
    pub const fn new(threshold: u64) -> Self {
        Self { threshold }
    }
}

impl Default for CostRouter {
    fn default() -> Self {
        Self::new(RuntimeConfig::default().heavy_threshold)
    }
}

impl RequestRouter for CostRouter {
    fn route(&self, request: &ValidatedRequest) -> PoolKind {
        if request.estimated_cost() > self.threshold {
            PoolKind::Heavy
        } else {
            PoolKind::Light
        }
    }
}

enum Job {
    Execute {
        request: Box<ValidatedRequest>,
        reply: Sender<SimResult<GenerateResponse>>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

struct WorkerPool {
    tx: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl WorkerPool {
    fn start(kind: PoolKind, workers: usize, queue_capacity: usize, engine: &Arc<SimEngine>) -> SimResult<Self> {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let engine = Arc::clone(engine);
            let handle = thread::Builder::new()
                .name(format!("rafsim-{}-{idx}", kind.as_str()))
                .spawn(move || loop {
                    match rx.recv() {
                        Ok(Job::Execute { request, reply }) => {
                            debug!(pool = kind.as_str(), request_id = %request.request_id, "job started");
                            let result = engine.execute(&request);
                            let _ = reply.send(result);
                        }
                        Err(_) => break,

                        #[cfg(test)]
                        Ok(Job::Sleep { duration, reply }) => {
                            thread::sleep(duration);
                            let _ = reply.send(());
                        }
                    }
                })
                .map_err(|e| SimError::internal(format!("failed to spawn {} worker: {e}", kind.as_str())))?;
            handles.push(handle);
        }

        Ok(Self {
            tx,
            workers: handles,
            queue_capacity,
        })
    }

    /// A pool with no workers, left behind once the real one is shut down.
    fn closed() -> Self {
        Self {
            tx: bounded::<Job>(1).0,
            workers: Vec::new(),
            queue_capacity: 1,
        }
    }

    fn try_submit(&self, job: Job, kind: PoolKind) -> SimResult<()> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(pool = kind.as_str(), capacity = self.queue_capacity, "queue full");
                Err(ExecutionError::QueueFull {
                    pool: kind.as_str().to_string(),
                    capacity: self.queue_capacity,
                }
                .into())
            }
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected {
                pool: kind.as_str().to_string(),
            }
            .into()),
        }
    }

    fn shutdown(self) {
        // Workers drain queued jobs, then see the closed channel and exit.
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

/// Handle returned by [`SimRuntime::submit`].
pub struct ExecutionHandle {
    pool: PoolKind,
    rx: Receiver<SimResult<GenerateResponse>>,
}

impl ExecutionHandle {
    /// Returns the pool selected by the router.
    #[must_use]
    pub const fn pool(&self) -> PoolKind {
        self.pool
    }

    /// Waits for the execution to complete.
    pub fn join(self) -> SimResult<GenerateResponse> {
        self.rx.recv().map_err(|_| -> SimError {
            ExecutionError::Disconnected {
                pool: self.pool.as_str().to_string(),
            }
            .into()
        })?
    }

    /// Waits for the execution to complete with a timeout.
    pub fn join_timeout(self, timeout: Duration) -> SimResult<GenerateResponse> {
        self.rx.recv_timeout(timeout).map_err(|err| -> SimError {
            match err {
                RecvTimeoutError::Timeout => ExecutionError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
                .into(),
                RecvTimeoutError::Disconnected => ExecutionError::Disconnected {
                    pool: self.pool.as_str().to_string(),
                }
                .into(),
            }
        })?
    }
}

/// A routed runtime over a shared engine.
pub struct SimRuntime<R: RequestRouter = CostRouter> {
    router: R,
    engine: Arc<SimEngine>,
    light: WorkerPool,
    heavy: WorkerPool,
}

impl SimRuntime<CostRouter> {
    /// Create a runtime routing by `config.heavy_threshold`.
    pub fn new(engine: SimEngine, config: &RuntimeConfig) -> SimResult<Self> {
        Self::with_router(engine, CostRouter::new(config.heavy_threshold), config)
    }
}

impl<R: RequestRouter> SimRuntime<R> {
    /// Create a runtime with a custom router.
    pub fn with_router(engine: SimEngine, router: R, config: &RuntimeConfig) -> SimResult<Self> {
        config.validate()?;
        let engine = Arc::new(engine);
        let light = WorkerPool::start(PoolKind::Light, config.light_workers, config.queue_capacity, &engine)?;
        let heavy = WorkerPool::start(PoolKind::Heavy, config.heavy_workers, config.queue_capacity, &engine)?;
        Ok(Self {
            router,
            engine,
            light,
            heavy,
        })
    }

    /// Validates `request` on the caller's thread and queues it on the routed pool.
    pub fn submit(&self, request: &GenerateRequest) -> SimResult<ExecutionHandle> {
        let validated = request.validate(self.engine.config())?;
        let pool = self.router.route(&validated);
        let (tx, rx) = bounded::<SimResult<GenerateResponse>>(1);
        let job = Job::Execute {
            request: Box::new(validated),
            reply: tx,
        };
        self.pool(pool).try_submit(job, pool)?;
        Ok(ExecutionHandle { pool, rx })
    }

    /// Executes a request on the routed pool and waits for it.
    pub fn generate(&self, request: &GenerateRequest) -> SimResult<GenerateResponse> {
        self.submit(request)?.join()
    }

    /// Returns the underlying engine.
    #[must_use]
    pub fn engine(&self) -> &SimEngine {
        &self.engine
    }

    fn pool(&self, kind: PoolKind) -> &WorkerPool {
        match kind {
            PoolKind::Light => &self.light,
            PoolKind::Heavy => &self.heavy,
        }
    }

    #[cfg(test)]
    fn submit_sleep(&self, kind: PoolKind, duration: Duration) -> SimResult<Receiver<()>> {
        let (tx, rx) = bounded::<()>(1);
        self.pool(kind).try_submit(Job::Sleep { duration, reply: tx }, kind)?;
        Ok(rx)
    }
}

impl<R: RequestRouter> Drop for SimRuntime<R> {
    fn drop(&mut self) {
        std::mem::replace(&mut self.light, WorkerPool::closed()).shutdown();
        std::mem::replace(&mut self.heavy, WorkerPool::closed()).shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::EngineConfig;

    fn request(saturation: i64, runs: i64) -> GenerateRequest {
        GenerateRequest::builder()
            .simulator_id("raf")
            .saturation(saturation)
            .runs(runs)
            .build()
            .unwrap()
    }

    fn small_config() -> RuntimeConfig {
        RuntimeConfig {
            light_workers: 1,
            heavy_workers: 1,
            queue_capacity: 16,
            heavy_threshold: 100,
        }
    }

    #[test]
    fn router_routes_by_cost() {
        let router = CostRouter::new(100);
        let config = EngineConfig::default();
        let cheap = request(10, 5).validate(&config).unwrap();
        let expensive = request(50, 5).validate(&config).unwrap();
        assert_eq!(router.route(&cheap), PoolKind::Light);
        assert_eq!(router.route(&expensive), PoolKind::Heavy);
    }

    #[test]
    fn heavy_work_does_not_starve_light() {
        let runtime = SimRuntime::new(SimEngine::with_builtin(), &small_config()).unwrap();

        // Occupy the heavy worker.
        let sleep = runtime.submit_sleep(PoolKind::Heavy, Duration::from_millis(300)).unwrap();

        let handle = runtime.submit(&request(10, 2)).unwrap();
        assert_eq!(handle.pool(), PoolKind::Light);
        let response = handle.join_timeout(Duration::from_millis(250)).unwrap();
        assert_eq!(response.entries.len(), 1);

        sleep.recv_timeout(Duration::from_secs(2)).unwrap();
    }

    #[test]
    fn full_queue_is_reported_not_blocked() {
        let config = RuntimeConfig {
            queue_capacity: 1,
            ..small_config()
        };
        let runtime = SimRuntime::new(SimEngine::with_builtin(), &config).unwrap();
        let results: Vec<_> = (0..3)
            .map(|_| runtime.submit_sleep(PoolKind::Light, Duration::from_millis(100)))
            .collect();
        let full = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .find(|e| e.kind() == "queue_full")
            .expect("one submission should hit a full queue");
        assert!(full.is_retryable());
    }

    #[test]
    fn invalid_requests_fail_before_queueing() {
        let runtime = SimRuntime::new(SimEngine::with_builtin(), &small_config()).unwrap();
        let err = runtime.submit(&request(10, 0)).err().unwrap();
        assert!(err.is_validation());
    }

    #[test]
    fn join_reports_disconnected_when_reply_sender_dropped() {
        let (tx, rx) = bounded::<SimResult<GenerateResponse>>(1);
        drop(tx);

        let handle = ExecutionHandle {
            pool: PoolKind::Light,
            rx,
        };
        let err = handle.join().unwrap_err();
        let SimError::Execution(ExecutionError::Disconnected { pool }) = err else {
            panic!("expected Disconnected, got {err:?}");
        };
        assert_eq!(pool, "light");
    }

    #[test]
    fn join_timeout_reports_timeout_while_pending() {
        let (_tx, rx) = bounded::<SimResult<GenerateResponse>>(1);
        let handle = ExecutionHandle {
            pool: PoolKind::Heavy,
            rx,
        };
        let err = handle.join_timeout(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err, SimError::from(ExecutionError::Timeout { duration_ms: 10 }));
    }
}
