use std::fmt;
use std::future::Future;
use std::pin::Pin;

use super::Target;

pub type RemoteFuture = Pin<Box<dyn Future<Output = Result<Vec<Target>, RemoteSearchError>> + Send>>;

/// Network-backed search for targets the local index does not know about,
/// such as public usernames. Results are passed through in server order.
///
/// The returned future may be dropped or outlive its query; the orchestrator
/// ignores completions for superseded generations.
pub trait RemoteSearchService: Send + Sync + 'static {
    fn search(&self, text: &str, limit: usize) -> RemoteFuture;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSearchError {
    Network(String),
    Server(String),
    Unavailable,
}

impl fmt::Display for RemoteSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteSearchError::Network(e) => write!(f, "network error: {}", e),
            RemoteSearchError::Server(e) => write!(f, "server error: {}", e),
            RemoteSearchError::Unavailable => write!(f, "remote search unavailable"),
        }
    }
}

impl std::error::Error for RemoteSearchError {}

/// Service for sessions without a network connection. Every call fails with
/// [`RemoteSearchError::Unavailable`], so only local results show up.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl RemoteSearchService for Offline {
    fn search(&self, _text: &str, _limit: usize) -> RemoteFuture {
        Box::pin(async { Err(RemoteSearchError::Unavailable) })
    }
}
