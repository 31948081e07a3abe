use std::path::{Path, PathBuf};

use log::{debug, error, info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::database;
use crate::domain::Game;
use crate::store::{MatchRecorder, SqliteStore};

/// Fire-and-forget queue of games whose images should be linked to the local cache.
///
/// Enqueueing never blocks and never fails the caller; the pairing response is
/// returned without waiting for the worker.
#[derive(Clone)]
pub struct ImageQueue {
    sender: UnboundedSender<Game>,
}

impl ImageQueue {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(store: SqliteStore, cache_dir: PathBuf) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver, store, cache_dir));
        (Self { sender }, worker)
    }

    pub fn enqueue(&self, game: &Game) {
        if game.image_path.is_some() || game.image_url.is_none() {
            return;
        }
        if self.sender.send(game.clone()).is_err() {
            debug!("Image worker stopped, dropping {}", game.appid);
        }
    }
}

async fn run_worker(mut receiver: UnboundedReceiver<Game>, store: SqliteStore, cache_dir: PathBuf) {
    info!("Image cache worker watching {}", cache_dir.display());
    while let Some(game) = receiver.recv().await {
        let Some(local) = cached_image_path(&cache_dir, &game) else {
            continue;
        };
        if !tokio::fs::try_exists(&local).await.unwrap_or(false) {
            debug!("No cached image for {} at {}", game.appid, local.display());
            continue;
        }
        if let Err(e) = link_image(&store, &game.appid, &local) {
            error!("Failed to record cached image for {}: {:?}", game.appid, e);
        }
    }
    debug!("Image cache worker stopped");
}

fn link_image(store: &SqliteStore, appid: &str, local: &Path) -> anyhow::Result<()> {
    let _guard = store.lock_writes();
    let conn = store.connection()?;
    database::games::set_image_path(&conn, appid, &local.to_string_lossy())?;
    debug!("Linked cached image for {}", appid);
    Ok(())
}

/// `<cache_dir>/<appid>.<ext>`, with the extension taken from the URL path.
pub fn cached_image_path(cache_dir: &Path, game: &Game) -> Option<PathBuf> {
    let url = game.image_url.as_deref()?;
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())?;
    Some(cache_dir.join(format!("{}.{}", game.appid, ext)))
}
