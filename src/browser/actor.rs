//! Actor runtime that owns the browser state and runs reducer effects.
//!
//! Remote calls run as spawned tasks and report back through a completion
//! channel, so several calls (including overlapping refreshes) may be in
//! flight at once. All state changes still happen on the actor task, one
//! reducer step at a time.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::reducer::{reduce_browser, BrowserAction, BrowserEffect, Mutation};
use super::state::BrowserState;
use crate::api::{Outcome, StorageClient, StorageService};
use crate::config::ClientConfig;
use crate::download::{DirectorySaver, SaveTarget};
use crate::error::{Result, StoreError};
use crate::fs::{Entry, PendingFile};
use crate::notice::{NoticeSink, TracingNotices};
use crate::path::Location;

/// Cloneable front end to a running browser.
#[derive(Clone)]
pub struct BrowserHandle {
    tx: mpsc::Sender<BrowserCommand>,
}

enum BrowserCommand {
    Dispatch {
        action: BrowserAction,
        reply: oneshot::Sender<BrowserState>,
    },
    Snapshot {
        reply: oneshot::Sender<BrowserState>,
    },
    Settle {
        reply: oneshot::Sender<BrowserState>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

enum Completion {
    Action(BrowserAction),
    Detached,
}

struct BrowserActor {
    state: BrowserState,
    service: Arc<dyn StorageService>,
    notices: Arc<dyn NoticeSink>,
    saver: Arc<dyn SaveTarget>,
    rx: mpsc::Receiver<BrowserCommand>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    outstanding: usize,
    settle_waiters: Vec<oneshot::Sender<BrowserState>>,
}

impl BrowserHandle {
    /// Start a browser at the root. The root listing is fetched immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        service: Arc<dyn StorageService>,
        notices: Arc<dyn NoticeSink>,
        saver: Arc<dyn SaveTarget>,
    ) -> Self {
        BrowserActor::spawn(service, notices, saver)
    }

    /// Start a browser against the HTTP service described by `config`.
    ///
    /// Notices are logged and downloads land in `config.download_dir`.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let client = StorageClient::from_config(config)?;
        let saver = DirectorySaver::new(client.clone(), &config.download_dir);
        Ok(Self::spawn(
            Arc::new(client),
            Arc::new(TracingNotices),
            Arc::new(saver),
        ))
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> BrowserCommand,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .await
            .map_err(|_| StoreError::ActorStopped)?;
        rx.await.map_err(|_| StoreError::ActorStopped)
    }

    /// Apply an action and return the state right after the reducer step.
    pub async fn dispatch(&self, action: BrowserAction) -> Result<BrowserState> {
        self.request(|reply| BrowserCommand::Dispatch { action, reply })
            .await
    }

    /// Current state, without waiting for outstanding calls.
    pub async fn snapshot(&self) -> Result<BrowserState> {
        self.request(|reply| BrowserCommand::Snapshot { reply })
            .await
    }

    /// Wait until no remote call is outstanding, then return the state.
    pub async fn settle(&self) -> Result<BrowserState> {
        self.request(|reply| BrowserCommand::Settle { reply }).await
    }

    /// Navigate to a path, normalizing it first.
    pub async fn navigate_to(&self, path: &str) -> Result<BrowserState> {
        let location = Location::parse(path)?;
        self.dispatch(BrowserAction::NavigateTo(location)).await
    }

    pub async fn navigate_to_parent(&self) -> Result<BrowserState> {
        self.dispatch(BrowserAction::NavigateToParent).await
    }

    pub async fn refresh(&self) -> Result<BrowserState> {
        self.dispatch(BrowserAction::Refresh).await
    }

    pub async fn set_directory_name(&self, name: &str) -> Result<BrowserState> {
        self.dispatch(BrowserAction::SetDirectoryName(name.to_string()))
            .await
    }

    /// Submit the create-directory controller.
    pub async fn submit_directory(&self) -> Result<BrowserState> {
        self.dispatch(BrowserAction::SubmitDirectory).await
    }

    /// Set the candidate name and submit in one step.
    pub async fn mkdir(&self, name: &str) -> Result<BrowserState> {
        self.set_directory_name(name).await?;
        self.submit_directory().await
    }

    pub async fn select_file(&self, file: PendingFile) -> Result<BrowserState> {
        self.dispatch(BrowserAction::SelectFile(file)).await
    }

    pub async fn clear_file(&self) -> Result<BrowserState> {
        self.dispatch(BrowserAction::ClearFile).await
    }

    /// Submit the upload controller. Without a selected file nothing happens.
    pub async fn submit_upload(&self) -> Result<BrowserState> {
        self.dispatch(BrowserAction::SubmitUpload).await
    }

    /// Select a file and submit in one step.
    pub async fn upload(&self, file: PendingFile) -> Result<BrowserState> {
        self.select_file(file).await?;
        self.submit_upload().await
    }

    pub async fn remove(&self, entry: &Entry) -> Result<BrowserState> {
        self.dispatch(BrowserAction::Remove(entry.clone())).await
    }

    pub async fn download(&self, entry: &Entry) -> Result<BrowserState> {
        self.dispatch(BrowserAction::Download(entry.clone())).await
    }

    /// Enter a directory or download a file.
    pub async fn activate(&self, entry: &Entry) -> Result<BrowserState> {
        self.dispatch(BrowserAction::Activate(entry.clone())).await
    }

    /// Stop the actor. Outstanding calls finish but their results are dropped.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(BrowserCommand::Shutdown { reply: tx }).await;
        let _ = rx.await;
    }
}

impl BrowserActor {
    fn spawn(
        service: Arc<dyn StorageService>,
        notices: Arc<dyn NoticeSink>,
        saver: Arc<dyn SaveTarget>,
    ) -> BrowserHandle {
        let (tx, rx) = mpsc::channel(64);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let actor = BrowserActor {
            state: BrowserState::new(),
            service,
            notices,
            saver,
            rx,
            completions_tx,
            completions_rx,
            outstanding: 0,
            settle_waiters: Vec::new(),
        };
        tokio::spawn(actor.run());
        BrowserHandle { tx }
    }

    async fn run(mut self) {
        self.apply(BrowserAction::NavigateTo(Location::root()));

        loop {
            tokio::select! {
                cmd = self.rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Some(done) = self.completions_rx.recv() => {
                    self.outstanding = self.outstanding.saturating_sub(1);
                    if let Completion::Action(action) = done {
                        self.apply(action);
                    }
                    self.wake_settled();
                }
            }
        }
        debug!("browser actor stopped");
    }

    /// Returns `true` when the actor should stop.
    fn handle_command(&mut self, cmd: BrowserCommand) -> bool {
        match cmd {
            BrowserCommand::Dispatch { action, reply } => {
                self.apply(action);
                let _ = reply.send(self.state.clone());
            }
            BrowserCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
            }
            BrowserCommand::Settle { reply } => {
                self.settle_waiters.push(reply);
                self.wake_settled();
            }
            BrowserCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }
        false
    }

    fn apply(&mut self, action: BrowserAction) {
        for effect in reduce_browser(&mut self.state, action) {
            self.run_effect(effect);
        }
    }

    fn wake_settled(&mut self) {
        if self.outstanding > 0 {
            return;
        }
        for waiter in self.settle_waiters.drain(..) {
            let _ = waiter.send(self.state.clone());
        }
    }

    fn run_effect(&mut self, effect: BrowserEffect) {
        match effect {
            BrowserEffect::ShowNotice(notice) => self.notices.notify(&notice),
            BrowserEffect::FetchListing { token, location } => {
                let service = self.service.clone();
                let fallback = Completion::Action(BrowserAction::Refreshed {
                    token,
                    location: location.clone(),
                    result: Err(TASK_ABORTED.to_string()),
                });
                self.spawn_task(
                    async move {
                        let result = service
                            .list(&location)
                            .await
                            .map_err(|e| e.to_string());
                        Completion::Action(BrowserAction::Refreshed {
                            token,
                            location,
                            result,
                        })
                    },
                    fallback,
                );
            }
            BrowserEffect::CreateDirectory { path } => {
                let service = self.service.clone();
                let mutation = Mutation::CreateDirectory { path: path.clone() };
                self.spawn_task(
                    async move {
                        let outcome = service.create_directory(&path).await;
                        Completion::Action(BrowserAction::MutationFinished {
                            mutation: Mutation::CreateDirectory { path },
                            outcome,
                        })
                    },
                    aborted(mutation),
                );
            }
            BrowserEffect::UploadFile { path, file } => {
                let service = self.service.clone();
                let mutation = Mutation::Upload { path: path.clone() };
                self.spawn_task(
                    async move {
                        let outcome = service.upload_file(&path, &file).await;
                        Completion::Action(BrowserAction::MutationFinished {
                            mutation: Mutation::Upload { path },
                            outcome,
                        })
                    },
                    aborted(mutation),
                );
            }
            BrowserEffect::RemoveEntry { entry } => {
                let service = self.service.clone();
                let mutation = Mutation::Remove {
                    entry: entry.clone(),
                };
                self.spawn_task(
                    async move {
                        let outcome = service.remove_entry(&entry.path).await;
                        Completion::Action(BrowserAction::MutationFinished {
                            mutation: Mutation::Remove { entry },
                            outcome,
                        })
                    },
                    aborted(mutation),
                );
            }
            BrowserEffect::SaveFile { path } => {
                let saver = self.saver.clone();
                self.spawn_task(
                    async move {
                        if let Err(e) = saver.save(&path).await {
                            warn!(path = %path, error = %e, "download failed");
                        }
                        Completion::Detached
                    },
                    Completion::Detached,
                );
            }
        }
    }

    /// Run `task` on its own tokio task. If it panics or is cancelled,
    /// `fallback` is reported instead so in-flight flags and `settle` recover.
    fn spawn_task<F>(&mut self, task: F, fallback: Completion)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.outstanding += 1;
        let tx = self.completions_tx.clone();
        let worker = tokio::spawn(task);
        tokio::spawn(async move {
            let done = match worker.await {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "browser task aborted");
                    fallback
                }
            };
            let _ = tx.send(done);
        });
    }
}

const TASK_ABORTED: &str = "task aborted";

fn aborted(mutation: Mutation) -> Completion {
    Completion::Action(BrowserAction::MutationFinished {
        mutation,
        outcome: Outcome::Failure {
            status: None,
            message: TASK_ABORTED.to_string(),
        },
    })
}
