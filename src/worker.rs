//! Background translation worker.
//!
//! One thread owns the in-progress conversion. Collaborators publish
//! requests at arbitrary frequency (every keystroke, typically); the worker
//! always acts on the most recently published request and abandons
//! superseded work between conversion steps, so exactly one result is
//! delivered per request that survives to completion. Re-publishing an
//! identical request is a no-op.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::converter::{TranslateMode, TranslationPass};
use crate::dict::{CharacterSet, CodeDictionary};

// ---------------------------------------------------------------------------
// Request / work types
// ---------------------------------------------------------------------------

/// One published conversion request. Immutable once a pass has been built
/// from it; a superseded request is abandoned, never merged with its
/// successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub mode: TranslateMode,
    pub charset: CharacterSet,
}

struct WorkItem {
    request: TranslateRequest,
    generation: u64,
}

enum WorkerMsg {
    Publish(WorkItem),
    Shutdown,
}

// ---------------------------------------------------------------------------
// TranslatorWorker
// ---------------------------------------------------------------------------

/// Handle to the background translation thread.
///
/// Results are polled from the collaborator side; one result string arrives
/// per completed, non-superseded pass.
pub struct TranslatorWorker {
    work_tx: mpsc::Sender<WorkerMsg>,
    result_rx: Mutex<mpsc::Receiver<String>>,
    generation: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TranslatorWorker {
    pub fn new(dict: Arc<CodeDictionary>) -> Self {
        let generation = Arc::new(AtomicU64::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let (work_tx, work_rx) = mpsc::channel::<WorkerMsg>();
        let (result_tx, result_rx) = mpsc::channel::<String>();

        let handle = {
            let generation = Arc::clone(&generation);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("dianma-translate".into())
                .spawn(move || translate_worker(work_rx, result_tx, generation, stop, dict))
                .expect("failed to spawn translate worker")
        };

        Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
            generation,
            stop,
            handle: Some(handle),
        }
    }

    /// Publish a request. Last write wins: anything still in flight for an
    /// earlier request is abandoned at the next step boundary.
    pub fn publish(&self, request: TranslateRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.work_tx.send(WorkerMsg::Publish(WorkItem {
            request,
            generation,
        }));
    }

    /// Non-blocking poll for a completed result.
    pub fn try_recv_result(&self) -> Option<String> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a completed result.
    pub fn recv_result_timeout(&self, timeout: Duration) -> Option<String> {
        let rx = self.result_rx.lock().ok()?;
        rx.recv_timeout(timeout).ok()
    }

    /// Cooperative stop. The worker checks the signal between conversion
    /// steps and exits promptly without delivering the in-progress pass.
    /// Idempotent; results already delivered remain pollable.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.work_tx.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Worker thread
// ---------------------------------------------------------------------------

fn translate_worker(
    work_rx: mpsc::Receiver<WorkerMsg>,
    result_tx: mpsc::Sender<String>,
    generation: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    dict: Arc<CodeDictionary>,
) {
    // Request of the in-progress or last completed pass. Used to recognize
    // identical republishes, which must not restart work or re-deliver.
    let mut current: Option<TranslateRequest> = None;

    while let Ok(msg) = work_rx.recv() {
        let mut item = match msg {
            WorkerMsg::Publish(item) => item,
            WorkerMsg::Shutdown => return,
        };

        'pass: loop {
            // Drain the queue down to the most recently published request.
            while let Ok(msg) = work_rx.try_recv() {
                match msg {
                    WorkerMsg::Publish(newer) => item = newer,
                    WorkerMsg::Shutdown => return,
                }
            }
            if stop.load(Ordering::SeqCst) {
                return;
            }
            // A stale generation means a newer publish is in flight but not
            // queued yet; go back to the blocking recv and pick it up there.
            if item.generation != generation.load(Ordering::SeqCst) {
                break 'pass;
            }
            if current.as_ref() == Some(&item.request) {
                break 'pass;
            }

            // INIT: the active variant must be loaded. Failure means no
            // result for this pass; the next publish retries from here.
            if let Err(e) = dict.load(item.request.charset) {
                warn!(error = %e, "dictionary load failed, no result for this pass");
                current = None;
                break 'pass;
            }
            current = Some(item.request.clone());
            let mut pass = TranslationPass::new(
                item.request.mode,
                item.request.charset,
                item.request.text.clone(),
            );

            // PROCESSING: one conversion step per turn. Between steps, honor
            // the stop signal and restart on any change of request.
            loop {
                if stop.load(Ordering::SeqCst) {
                    return;
                }
                match work_rx.try_recv() {
                    Ok(WorkerMsg::Publish(newer)) => {
                        let changed = newer.request != item.request;
                        item = newer;
                        if changed {
                            continue 'pass;
                        }
                    }
                    Ok(WorkerMsg::Shutdown) => return,
                    Err(_) => {}
                }
                if pass.is_done() {
                    break;
                }
                if let Err(e) = pass.step(&dict) {
                    warn!(error = %e, "conversion step failed, no result for this pass");
                    current = None;
                    break 'pass;
                }
            }

            // SEND: deliver exactly once, then go quiescent until the
            // published request changes.
            debug!("delivering translated result");
            let _ = result_tx.send(pass.finish());
            break 'pass;
        }
    }
}
