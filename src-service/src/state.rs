//! VAD lifecycle management for the service.
//!
//! `VadController` owns the start/stop lifecycle: the recorder child, the
//! pipeline task, the active options, and the status counters the control
//! plane polls. Start and stop are serialized through one mutex; status and
//! options reads never touch that mutex.

use crate::error::VadError;
use crate::mic;
use crate::vad::{self, SileroModel, VadPipeline};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::process::Child;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vadrec_common::{VadOptions, VadOptionsPatch, VadStatus};

/// Status fields shared between the pipeline task and the control plane.
/// Counters are atomic; the path sits behind a short-lived lock.
#[derive(Clone, Default)]
pub struct SharedStatus {
    running: Arc<AtomicBool>,
    segments_saved: Arc<AtomicU64>,
    last_segment_path: Arc<std::sync::Mutex<Option<String>>>,
}

impl SharedStatus {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Called by the segment recorder after a WAV is durably written.
    pub fn record_segment(&self, path: &Path) {
        self.segments_saved.fetch_add(1, Ordering::SeqCst);
        let mut last = self
            .last_segment_path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(path.display().to_string());
    }

    pub fn snapshot(&self) -> VadStatus {
        let last_segment_path = self
            .last_segment_path
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        VadStatus {
            running: self.is_running(),
            segments_saved: self.segments_saved.load(Ordering::SeqCst),
            last_segment_path,
        }
    }
}

pub struct VadController {
    options: RwLock<VadOptions>,
    status: SharedStatus,
    /// Serializes start/stop so they can never interleave.
    lifecycle: Mutex<()>,
    abort: Mutex<Option<Arc<AtomicBool>>>,
    child: Mutex<Option<Child>>,
    pipeline_task: Mutex<Option<JoinHandle<()>>>,
}

impl VadController {
    pub fn new(options: VadOptions) -> Self {
        Self {
            options: RwLock::new(options),
            status: SharedStatus::default(),
            lifecycle: Mutex::new(()),
            abort: Mutex::new(None),
            child: Mutex::new(None),
            pipeline_task: Mutex::new(None),
        }
    }

    /// Current status snapshot. Never blocks on the lifecycle.
    pub fn status(&self) -> VadStatus {
        self.status.snapshot()
    }

    pub async fn options(&self) -> VadOptions {
        self.options.read().await.clone()
    }

    /// Merge an options patch. Rejected while a pipeline is running.
    pub async fn update_options(&self, patch: &VadOptionsPatch) -> Result<(), VadError> {
        if self.status.is_running() {
            return Err(VadError::BusyRunning);
        }
        let mut options = self.options.write().await;
        let mut merged = options.clone();
        merged.apply(patch);
        merged.validate().map_err(VadError::InvalidOptions)?;
        *options = merged;
        Ok(())
    }

    /// Start a capture/inference pipeline. Any error is returned before
    /// `running` flips to true.
    pub async fn start(&self, patch: Option<VadOptionsPatch>) -> Result<VadStatus, VadError> {
        let _guard = self.lifecycle.lock().await;

        if self.status.is_running() {
            return Err(VadError::AlreadyRunning);
        }
        self.reap_finished_pipeline().await;

        if let Some(ref patch) = patch {
            if !patch.is_empty() {
                let mut options = self.options.write().await;
                let mut merged = options.clone();
                merged.apply(patch);
                merged.validate().map_err(VadError::InvalidOptions)?;
                *options = merged;
            }
        }
        let options = self.options.read().await.clone();

        std::fs::create_dir_all(&options.out_dir)?;
        let model = SileroModel::load(&options.model_path, options.rate)?;
        let (child, stdout) = mic::spawn(options.rate)?;

        let abort = Arc::new(AtomicBool::new(false));
        let pipeline = VadPipeline::new(model, &options, self.status.clone());

        self.status.set_running(true);
        *self.child.lock().await = Some(child);
        *self.abort.lock().await = Some(abort.clone());
        *self.pipeline_task.lock().await = Some(tokio::spawn(vad::run(
            stdout,
            pipeline,
            abort,
            self.status.clone(),
        )));

        info!(
            "VAD started (model: {}, out: {})",
            options.model_path.display(),
            options.out_dir.display()
        );
        Ok(self.status.snapshot())
    }

    /// Stop the pipeline and flush any in-progress segment. Idempotent;
    /// never fails — teardown problems are logged and swallowed.
    pub async fn stop(&self) -> VadStatus {
        let _guard = self.lifecycle.lock().await;

        if let Some(abort) = self.abort.lock().await.take() {
            abort.store(true, Ordering::SeqCst);
        }
        if let Some(mut child) = self.child.lock().await.take() {
            mic::terminate(&mut child).await;
        }
        if let Some(task) = self.pipeline_task.lock().await.take() {
            // the task performs the final flush before it resolves
            if let Err(err) = task.await {
                warn!("pipeline task join failed: {}", err);
            }
            info!("VAD stopped");
        }
        self.status.set_running(false);

        self.status.snapshot()
    }

    /// Drop remnants of a pipeline that exited on its own (recorder died,
    /// inference failure) so a new start begins clean.
    async fn reap_finished_pipeline(&self) {
        self.abort.lock().await.take();
        if let Some(mut child) = self.child.lock().await.take() {
            mic::terminate(&mut child).await;
        }
        if let Some(task) = self.pipeline_task.lock().await.take() {
            if let Err(err) = task.await {
                warn!("stale pipeline task join failed: {}", err);
            }
        }
    }
}
