use super::pipeline::{
    BuildError, BuildEvent, BuildOutput, BuildRequest, BuildResult, BuildStage, ExamBuilder,
};
use crate::compile::compiler::DocumentCompiler;
use crate::db::Store;
use crate::render::converter::MarkupConverter;
use crate::repo::content_repo::SqliteContentRepository;
use log::{error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use uuid::Uuid;

/// Handle to one background build.
pub struct BuildHandle {
    id: Uuid,
    events: Receiver<BuildEvent>,
    thread: JoinHandle<()>,
}

impl BuildHandle {
    /// Correlation id, also present in the worker's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Progress and terminal events; ends after `Finished`.
    pub fn events(&self) -> &Receiver<BuildEvent> {
        &self.events
    }

    /// Blocks until the build finishes, discarding progress events.
    pub fn wait(self) -> BuildResult<BuildOutput> {
        let mut outcome = None;
        while let Ok(event) = self.events.recv() {
            if let BuildEvent::Finished(result) = event {
                outcome = Some(result);
                break;
            }
        }

        if self.thread.join().is_err() {
            warn!("event=build_worker module=build status=panicked build_id={}", self.id);
        }

        outcome.unwrap_or_else(|| {
            Err(BuildError::Worker(
                "worker exited without reporting a result".to_string(),
            ))
        })
    }
}

/// Starts a build on a dedicated thread with its own store handle.
///
/// A panic inside the build is caught and reported as a `Finished` event
/// carrying `BuildError::Worker`.
///
/// # Errors
/// - `BuildError::Worker` when the OS refuses to spawn the thread.
pub fn spawn_build<C, K>(
    store: Store,
    builder: ExamBuilder<C, K>,
    request: BuildRequest,
) -> BuildResult<BuildHandle>
where
    C: MarkupConverter + Send + 'static,
    K: DocumentCompiler + Send + 'static,
{
    let id = Uuid::new_v4();
    let (sender, events) = mpsc::channel();

    let thread = thread::Builder::new()
        .name(format!("exam-build-{id}"))
        .spawn(move || {
            info!(
                "event=build_worker module=build status=start build_id={id} module_id={}",
                request.module_id
            );
            let run = || match store.connect() {
                Ok(conn) => {
                    let repo = SqliteContentRepository::new(&conn);
                    let progress_sender = sender.clone();
                    let mut report = move |stage: BuildStage| {
                        // Receiver may be gone; progress is advisory.
                        let _ = progress_sender.send(BuildEvent::Progress(stage));
                    };
                    builder.build(&repo, &request, &mut report)
                }
                Err(err) => Err(BuildError::Store(err)),
            };
            let result = panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                error!(
                    "event=build_worker module=build status=panicked build_id={id} payload={:?}",
                    message
                );
                Err(BuildError::Worker(format!("build panicked: {message}")))
            });
            info!(
                "event=build_worker module=build status={} build_id={id}",
                if result.is_ok() { "ok" } else { "error" }
            );
            let _ = sender.send(BuildEvent::Finished(result));
        })
        .map_err(|err| BuildError::Worker(format!("cannot spawn build thread: {err}")))?;

    Ok(BuildHandle { id, events, thread })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
