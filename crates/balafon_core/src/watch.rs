use std::path::{Path, PathBuf};

use balafon_common::VirtualModuleId;
use balafon_plugin::{DevServer, HmrPayload};
use derivative::Derivative;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use crate::{BuildResult, BuildSession, DetachedContext, ProducerRegistry};

/// Reverse index from a watched source file to the virtual module built from it.
///
/// One id per path. Storing a path again replaces the previous id; stale entries are only ever overwritten.
#[derive(Debug, Default)]
pub struct WatchTable {
  by_path: FxHashMap<PathBuf, VirtualModuleId>,
}

impl WatchTable {
  pub fn store(&mut self, path: &Path, id: VirtualModuleId) -> Option<VirtualModuleId> {
    self.by_path.insert(path.to_path_buf(), id)
  }

  pub fn get(&self, path: &Path) -> Option<&VirtualModuleId> {
    self.by_path.get(path)
  }

  pub fn len(&self) -> usize {
    self.by_path.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_path.is_empty()
  }
}

pub type WatchPredicate = Box<dyn Fn(&Path) -> bool + Send + Sync>;
pub type WatchHandler = Box<dyn Fn(&Path, &mut dyn DevServer) -> bool + Send + Sync>;

#[derive(Derivative)]
#[derivative(Debug)]
pub struct WatchListener {
  pub name: String,
  #[derivative(Debug = "ignore")]
  predicate: WatchPredicate,
  #[derivative(Debug = "ignore")]
  handler: WatchHandler,
}

impl WatchListener {
  pub fn new(
    name: impl Into<String>,
    predicate: impl Fn(&Path) -> bool + Send + Sync + 'static,
    handler: impl Fn(&Path, &mut dyn DevServer) -> bool + Send + Sync + 'static,
  ) -> Self {
    Self {
      name: name.into(),
      predicate: Box::new(predicate),
      handler: Box::new(handler),
    }
  }
}

/// Independent concerns reacting to the generic file change event.
#[derive(Debug, Default)]
pub struct WatchListeners {
  listeners: Vec<WatchListener>,
}

impl WatchListeners {
  pub fn register(&mut self, listener: WatchListener) {
    self.listeners.push(listener);
  }

  /// Runs every matching handler, even after one claimed the change.
  pub fn handle(&self, path: &Path, server: &mut dyn DevServer) -> bool {
    let mut claimed = false;
    for listener in &self.listeners {
      if (listener.predicate)(path) {
        let handled = (listener.handler)(path, server);
        tracing::debug!("listener {} handled {}: {handled}", listener.name, path.display());
        claimed |= handled;
      }
    }
    claimed
  }

  pub fn clear(&mut self) {
    self.listeners.clear();
  }

  pub fn len(&self) -> usize {
    self.listeners.len()
  }

  pub fn is_empty(&self) -> bool {
    self.listeners.is_empty()
  }
}

/// Turns file change events into invalidations of the virtual modules built from those files.
#[derive(Debug, Default)]
pub struct WatchBridge {
  listeners: Mutex<WatchListeners>,
}

impl WatchBridge {
  pub fn new(listeners: WatchListeners) -> Self {
    Self {
      listeners: Mutex::new(listeners),
    }
  }

  pub async fn register(&self, listener: WatchListener) {
    self.listeners.lock().await.register(listener);
  }

  pub async fn clear(&self) {
    self.listeners.lock().await.clear();
  }

  /// Returns `true` when something claimed the change and the host should not reload the page.
  pub async fn on_file_change(
    &self,
    registry: &ProducerRegistry,
    session: &BuildSession,
    server: &mut dyn DevServer,
    path: &Path,
  ) -> BuildResult<bool> {
    let mut claimed = false;

    if let Some(id) = session.watched_id(path).await {
      let mut ctx = DetachedContext::default();
      let previous = session.produced(&id).await;
      let source = registry.reload(session, &mut ctx, &id).await?;
      if previous.as_ref() == Some(&source) {
        tracing::debug!("{} changed but {} is unchanged", path.display(), id.requested());
      }
      server.invalidate_module(id.id());
      server.send(HmrPayload::Update {
        id: id.id().to_string(),
      });
      claimed = true;
    }

    let handled = self.listeners.lock().await.handle(path, server);
    Ok(claimed || handled)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use balafon_test_utils::TestHost;

  use super::*;

  #[test]
  fn storing_a_path_again_replaces_its_id() {
    let mut table = WatchTable::default();
    let path = Path::new("/project/components/Card.vue");
    table.store(path, VirtualModuleId::virtual_module("virtual:balafon/ssr/Card"));
    let previous = table.store(path, VirtualModuleId::virtual_module("virtual:balafon/ssr/Card2"));
    assert_eq!(previous.unwrap().requested(), "virtual:balafon/ssr/Card");
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(path).unwrap().requested(), "virtual:balafon/ssr/Card2");
  }

  #[test]
  fn every_matching_handler_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listeners = WatchListeners::default();
    for claims in [true, false] {
      let calls = calls.clone();
      listeners.register(WatchListener::new(
        "counter",
        |_| true,
        move |_, _| {
          calls.fetch_add(1, Ordering::SeqCst);
          claims
        },
      ));
    }
    listeners.register(WatchListener::new(
      "never",
      |_| false,
      |_, _| unreachable!(),
    ));

    let mut host = TestHost::default();
    assert!(listeners.handle(Path::new("/some/file.vue"), &mut host));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn cleared_listeners_never_fire() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut listeners = WatchListeners::default();
    let counter = calls.clone();
    listeners.register(WatchListener::new("counter", |_| true, move |_, _| {
      counter.fetch_add(1, Ordering::SeqCst);
      false
    }));
    listeners.clear();
    let mut host = TestHost::default();
    assert!(!listeners.handle(Path::new("/some/file"), &mut host));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(listeners.is_empty());
  }
}
