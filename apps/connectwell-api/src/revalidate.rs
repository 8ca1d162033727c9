//! Cache invalidation signals for whatever renders our data.
//!
//! Every successful write dispatches the paths whose rendered output is now
//! stale. Renderers (or an edge cache purger) subscribe; with no subscribers
//! a dispatch is a no-op.

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip signals (RecvError::Lagged).
const REVALIDATE_CAPACITY: usize = 256;

pub const COMMUNITIES_PATH: &str = "/communities";
pub const PROFILE_PATH: &str = "/profile";

pub fn community_path(id: &str) -> String {
    format!("{COMMUNITIES_PATH}/{id}")
}

/// A path whose cached rendering must be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidatePath(pub String);

#[derive(Clone)]
pub struct Revalidator {
    sender: broadcast::Sender<RevalidatePath>,
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Revalidator {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(REVALIDATE_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RevalidatePath> {
        self.sender.subscribe()
    }

    pub fn revalidate<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            let path = path.into();
            tracing::debug!(%path, "revalidate");
            // send() returns Err if there are no receivers; ignored.
            let _ = self.sender.send(RevalidatePath(path));
        }
    }
}
