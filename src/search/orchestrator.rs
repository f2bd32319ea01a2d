use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use tokio::sync::mpsc;

use super::local::{LocalIndex, LocalIndexError};
use super::matcher::{query_tokens, rank_local};
use super::merger::ResultMerger;
use super::recent::RecentTargets;
use super::remote::{RemoteSearchError, RemoteSearchService};
use super::selection::SelectionState;
use super::sequencer::{GenerationCounter, QuerySequencer};
use super::{Generation, ResultsSnapshot, SearchQuery, SearchResultItem, Target, TargetId};
use crate::config::SearchConfig;
use crate::error::AppError;

type ResultsCallback = Arc<dyn Fn(&ResultsSnapshot) + Send + Sync>;
type Subscribers = Arc<Mutex<Vec<ResultsCallback>>>;

/// Everything the apply loop reacts to. Processed strictly in arrival order.
enum Command {
    Submit(SearchQuery),
    LocalDone {
        generation: Generation,
        result: Result<Vec<SearchResultItem>, LocalIndexError>,
    },
    RemoteDue(Generation),
    RemoteDone {
        generation: Generation,
        result: Result<Vec<Target>, RemoteSearchError>,
    },
    Republish,
}

struct LocalJob {
    generation: Generation,
    tokens: Vec<String>,
}

/// Recipient search for the share picker.
///
/// Every call to [`search`](Self::search) gets a new generation. Local
/// matching starts right away on a single background worker; the remote
/// search starts once input has been quiet for the debounce window. Results
/// are applied on one task, and only for the newest generation, so late
/// completions from superseded queries never reach subscribers.
///
/// Must be created inside a tokio runtime. Dropping the handle stops the
/// apply loop and the worker thread.
pub struct SearchOrchestrator {
    commands: mpsc::UnboundedSender<Command>,
    generations: Arc<GenerationCounter>,
    // Stamping and sending happen together so submissions reach the loop in
    // generation order.
    submit: Mutex<()>,
    selection: Arc<Mutex<SelectionState>>,
    recent: Arc<RecentTargets>,
    subscribers: Subscribers,
}

impl SearchOrchestrator {
    pub fn spawn(
        config: &SearchConfig,
        local: Arc<dyn LocalIndex>,
        remote: Arc<dyn RemoteSearchService>,
        recent: Arc<RecentTargets>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| AppError::Other(format!("search needs a tokio runtime: {}", e)))?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (job_tx, job_rx) = std_mpsc::channel::<LocalJob>();
        let generations = Arc::new(GenerationCounter::new());
        let selection = Arc::new(Mutex::new(SelectionState::new()));
        let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));

        {
            let generations = Arc::clone(&generations);
            let results = commands.downgrade();
            thread::Builder::new()
                .name("local-search".to_string())
                .spawn(move || run_local_worker(local, job_rx, generations, results))?;
        }

        let apply = ApplyLoop {
            sequencer: QuerySequencer::new(config.debounce()),
            merger: ResultMerger::default(),
            current: None,
            published_current: false,
            remote_limit: config.remote_limit,
            local_jobs: job_tx,
            remote,
            recent: Arc::clone(&recent),
            selection: Arc::clone(&selection),
            subscribers: Arc::clone(&subscribers),
            commands: commands.downgrade(),
        };
        runtime.spawn(apply.run(command_rx));

        Ok(Self {
            commands,
            generations,
            submit: Mutex::new(()),
            selection,
            recent,
            subscribers,
        })
    }

    /// Submit the current text of the search box. Never blocks on search work.
    pub fn search(&self, text: &str) -> Generation {
        let _order = self.submit.lock().unwrap_or_else(|e| e.into_inner());
        let generation = self.generations.issue();
        log::debug!("search {} for {:?}", generation, text.trim());
        self.send(Command::Submit(SearchQuery::new(text, generation)));
        generation
    }

    /// Register a consumer. Called on the apply task for every republish,
    /// possibly several times per generation.
    pub fn on_results_changed<F>(&self, callback: F)
    where
        F: Fn(&ResultsSnapshot) + Send + Sync + 'static,
    {
        lock(&self.subscribers).push(Arc::new(callback));
    }

    /// Flip the selection of `id` and republish. Returns the new state.
    pub fn toggle_selection(&self, id: TargetId) -> bool {
        let selected = lock(&self.selection).toggle(id);
        self.send(Command::Republish);
        selected
    }

    pub fn is_selected(&self, id: TargetId) -> bool {
        lock(&self.selection).is_selected(id)
    }

    pub fn selected_ids(&self) -> Vec<TargetId> {
        lock(&self.selection).selected_ids()
    }

    pub fn selected_count(&self) -> usize {
        lock(&self.selection).selected_count()
    }

    /// Remember that the user just sent to `target`.
    pub fn record_interaction(&self, target: Target) {
        self.recent.touch(target);
        self.send(Command::Republish);
    }

    /// Keep `target` at the top of the empty-query list.
    pub fn pin(&self, target: Target) {
        self.recent.pin(target);
        self.send(Command::Republish);
    }

    pub fn unpin(&self, id: TargetId) -> bool {
        let unpinned = self.recent.unpin(id);
        if unpinned {
            self.send(Command::Republish);
        }
        unpinned
    }

    /// Drop `target` from the empty-query list, pinned or not.
    pub fn forget(&self, id: TargetId) {
        self.recent.remove(id);
        self.send(Command::Republish);
    }

    /// Close the picker session: clears and returns the selection.
    pub fn end_session(&self) -> Vec<TargetId> {
        let selected = {
            let mut selection = lock(&self.selection);
            let ids = selection.selected_ids();
            selection.clear();
            ids
        };
        self.send(Command::Republish);
        selected
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::warn!("search apply loop has stopped");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// Runs on its own thread, one job at a time in submission order.
fn run_local_worker(
    index: Arc<dyn LocalIndex>,
    jobs: std_mpsc::Receiver<LocalJob>,
    generations: Arc<GenerationCounter>,
    results: mpsc::WeakUnboundedSender<Command>,
) {
    while let Ok(job) = jobs.recv() {
        // A newer query was issued while this one sat in the queue; its
        // result would be discarded anyway.
        if job.generation < generations.latest() {
            log::debug!("skipping superseded local search {}", job.generation);
            continue;
        }

        let result = index
            .match_targets(&job.tokens)
            .map(|candidates| rank_local(candidates, &job.tokens));

        let Some(results) = results.upgrade() else {
            break;
        };
        if results
            .send(Command::LocalDone {
                generation: job.generation,
                result,
            })
            .is_err()
        {
            break;
        }
    }
    log::debug!("local search worker stopped");
}

struct ApplyLoop {
    sequencer: QuerySequencer,
    merger: ResultMerger,
    current: Option<SearchQuery>,
    published_current: bool,
    remote_limit: usize,
    local_jobs: std_mpsc::Sender<LocalJob>,
    remote: Arc<dyn RemoteSearchService>,
    recent: Arc<RecentTargets>,
    selection: Arc<Mutex<SelectionState>>,
    subscribers: Subscribers,
    commands: mpsc::WeakUnboundedSender<Command>,
}

impl ApplyLoop {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Submit(query) => self.on_submit(query),
                Command::LocalDone { generation, result } => self.on_local_done(generation, result),
                Command::RemoteDue(generation) => self.on_remote_due(generation),
                Command::RemoteDone { generation, result } => {
                    self.on_remote_done(generation, result)
                }
                Command::Republish => self.on_republish(),
            }
        }
        log::debug!("search apply loop stopped");
    }

    fn on_submit(&mut self, query: SearchQuery) {
        let generation = query.generation;
        let local_pending = self.sequencer.is_local_pending();
        let remote_armed = self.sequencer.is_remote_armed();
        if !self.sequencer.activate(generation) {
            log::debug!("ignoring out-of-order submission {}", generation);
            return;
        }
        if local_pending || remote_armed {
            log::debug!(
                "{} supersedes unfinished work (local pending: {}, remote armed: {})",
                generation,
                local_pending,
                remote_armed
            );
        }
        self.merger.reset(&query);
        self.published_current = false;
        self.current = Some(query.clone());

        if query.is_empty() {
            self.publish();
            return;
        }

        let job = LocalJob {
            generation,
            tokens: query_tokens(&query.text),
        };
        if self.local_jobs.send(job).is_err() {
            log::warn!("local search worker is gone; {} gets no local results", generation);
            self.merger.apply_local(None);
        } else {
            self.sequencer.local_dispatched(generation);
        }

        let commands = self.commands.clone();
        self.sequencer.arm_remote(generation, move || {
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::RemoteDue(generation));
            }
        });
    }

    fn on_local_done(
        &mut self,
        generation: Generation,
        result: Result<Vec<SearchResultItem>, LocalIndexError>,
    ) {
        if !self.sequencer.local_finished(generation) {
            log::debug!("discarding stale local results {}", generation);
            return;
        }
        match result {
            Ok(items) => self.merger.apply_local(Some(items)),
            Err(e) => {
                log::warn!("local search {} failed: {}", generation, e);
                self.merger.apply_local(None);
            }
        }
        self.publish();
    }

    fn on_remote_due(&mut self, generation: Generation) {
        if !self.sequencer.take_due(generation) {
            return;
        }
        let Some(query) = self.current.as_ref() else {
            return;
        };

        let remote = Arc::clone(&self.remote);
        let commands = self.commands.clone();
        let text = query.text.clone();
        let limit = self.remote_limit;
        log::debug!("dispatching remote search {} for {:?}", generation, text);
        tokio::spawn(async move {
            let result = remote.search(&text, limit).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::RemoteDone { generation, result });
            }
        });
    }

    fn on_remote_done(
        &mut self,
        generation: Generation,
        result: Result<Vec<Target>, RemoteSearchError>,
    ) {
        if !self.sequencer.is_active(generation) {
            log::debug!("discarding stale remote results {}", generation);
            return;
        }
        match result {
            Ok(mut targets) => {
                targets.truncate(self.remote_limit);
                self.merger.apply_remote(Some(targets));
            }
            Err(e) => {
                log::warn!("remote search {} failed: {}", generation, e);
                self.merger.apply_remote(None);
            }
        }
        self.publish();
    }

    fn on_republish(&mut self) {
        // Before the first partial lands there is nothing new to show; the
        // next publish carries the current selection anyway.
        if self.published_current {
            self.publish();
        }
    }

    fn publish(&mut self) {
        let recent = self.recent.snapshot();
        let selection = lock(&self.selection).snapshot();
        let snapshot = self.merger.snapshot(&recent, selection);
        self.published_current = true;
        if snapshot.is_settled() {
            log::debug!(
                "search {} settled with {} items",
                snapshot.generation,
                snapshot.items.len()
            );
        }

        let callbacks: Vec<ResultsCallback> = lock(&self.subscribers).clone();
        for callback in callbacks {
            callback(&snapshot);
        }
    }
}
