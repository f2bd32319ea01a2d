pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod store;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncBufReadExt, BufReader};

use config::SearchConfig;
use error::AppError;
use search::orchestrator::SearchOrchestrator;
use search::recent::RecentTargets;
use search::remote::Offline;
use search::TargetId;
use store::import::StoreDump;
use store::index::StoreIndex;
use store::Store;

pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub search: SearchOrchestrator,
}

/// One line of picker input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Query(String),
    Toggle(TargetId),
    Pin(TargetId),
    Unpin(TargetId),
    Forget(TargetId),
    Import(PathBuf),
    Send,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Input::Query(line.to_string()));
    };
    let mut parts = rest.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let target = parts.next();
    let id = || -> Result<TargetId, String> {
        let raw = target.ok_or_else(|| "missing target id".to_string())?;
        raw.parse::<i64>()
            .map(TargetId)
            .map_err(|e| format!("bad target id {:?}: {}", raw, e))
    };
    match command {
        "toggle" => Ok(Input::Toggle(id()?)),
        "pin" => Ok(Input::Pin(id()?)),
        "unpin" => Ok(Input::Unpin(id()?)),
        "forget" => Ok(Input::Forget(id()?)),
        "import" => target
            .map(|path| Input::Import(PathBuf::from(path)))
            .ok_or_else(|| "missing dump path".to_string()),
        "send" => Ok(Input::Send),
        other => Err(format!("unknown command :{}", other)),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl AppState {
    fn open(db_path: PathBuf) -> Result<Self, AppError> {
        let store = Store::open(&db_path)?;
        let config = SearchConfig::load(&store)?;
        let recent = Arc::new(RecentTargets::load(&store, config.recent_capacity)?);
        log::info!(
            "opened {} ({} users, {} chats, {} dialogs)",
            db_path.display(),
            store.user_count()?,
            store.chat_count()?,
            store.dialog_count()?
        );

        let store = Arc::new(Mutex::new(store));
        let local = Arc::new(StoreIndex::new(Arc::clone(&store), config.dialog_scan_limit));
        let search = SearchOrchestrator::spawn(&config, local, Arc::new(Offline), recent)?;
        search.on_results_changed(|snapshot| match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => log::error!("failed to encode results: {}", e),
        });

        Ok(Self { store, search })
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, Store>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Other("store lock poisoned".to_string()))
    }

    fn handle(&self, input: Input) -> Result<(), AppError> {
        match input {
            Input::Query(text) => {
                self.search.search(&text);
            }
            Input::Toggle(id) => {
                let selected = self.search.toggle_selection(id);
                log::debug!("{} selected: {}", id, selected);
            }
            Input::Pin(id) => {
                let store = self.lock_store()?;
                let Some(target) = store.resolve_target(id)? else {
                    return Err(AppError::Other(format!("unknown target {}", id)));
                };
                store.touch_recent(id, unix_now())?;
                store.set_recent_pinned(id, true)?;
                self.search.pin(target);
            }
            Input::Unpin(id) => {
                self.lock_store()?.set_recent_pinned(id, false)?;
                self.search.unpin(id);
            }
            Input::Forget(id) => {
                self.lock_store()?.remove_recent(id)?;
                self.search.forget(id);
            }
            Input::Import(path) => {
                let json = std::fs::read_to_string(&path)?;
                let dump: StoreDump = serde_json::from_str(&json)
                    .map_err(|e| AppError::Other(format!("bad dump {}: {}", path.display(), e)))?;
                self.lock_store()?.import(&dump)?;
            }
            Input::Send => {
                let ids = self.search.end_session();
                let now = unix_now();
                let store = self.lock_store()?;
                for id in &ids {
                    match store.resolve_target(*id)? {
                        Some(target) => {
                            store.touch_recent(*id, now)?;
                            self.search.record_interaction(target);
                        }
                        None => log::warn!("selected target {} is not in the store", id),
                    }
                }
                log::info!("sent to {} targets", ids.len());
            }
        }
        Ok(())
    }
}

/// Run the picker over stdin. Each line is either search text or a
/// `:`-prefixed command; every published result list goes to stdout as one
/// JSON line.
pub fn run(db_path: Option<PathBuf>) -> Result<(), AppError> {
    let db_path = db_path.unwrap_or_else(store::default_db_path);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let state = AppState::open(db_path)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let input = match parse_input(line.trim_end()) {
                Ok(input) => input,
                Err(e) => {
                    log::warn!("{}", e);
                    continue;
                }
            };
            if let Err(e) = state.handle(input) {
                log::error!("{}", e);
            }
        }
        Ok::<(), AppError>(())
    })
}
