use std::{fmt::Debug, sync::Arc};

use balafon_common::{ContentKind, IdNamespace, ModuleSource, VirtualModuleId};
use balafon_error::Error;
use balafon_plugin::PluginContext;
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::{emission, BuildResult, BuildSession, LoadContext};

/// Produces the content of one family of virtual modules.
#[async_trait::async_trait]
pub trait Producer: Debug + Send + Sync {
  fn kind(&self) -> ContentKind;

  async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource>;
}

/// Maps virtual specifiers to their producers.
///
/// Exact names win over prefixes. Names of chunks emitted during this build resolve too, so the host can load them.
#[derive(Debug, Default)]
pub struct ProducerRegistry {
  exact: FxHashMap<String, Arc<dyn Producer>>,
  prefixed: Vec<(String, Arc<dyn Producer>)>,
}

impl ProducerRegistry {
  pub fn register(&mut self, name: impl Into<String>, producer: Arc<dyn Producer>) {
    self.exact.insert(name.into(), producer);
  }

  pub fn register_prefix(&mut self, prefix: impl Into<String>, producer: Arc<dyn Producer>) {
    self.prefixed.push((prefix.into(), producer));
  }

  pub fn lookup(&self, requested: &str) -> Option<&Arc<dyn Producer>> {
    self.exact.get(requested).or_else(|| {
      self
        .prefixed
        .iter()
        .find(|(prefix, _)| requested.len() > prefix.len() && requested.starts_with(prefix.as_str()))
        .map(|(_, producer)| producer)
    })
  }

  /// Never fails: anything this registry does not know is passed through.
  pub async fn resolve(&self, session: &BuildSession, requested: &str) -> Option<VirtualModuleId> {
    if self.lookup(requested).is_some() {
      return Some(VirtualModuleId::virtual_module(requested));
    }
    if session.has_entry(requested).await {
      return Some(VirtualModuleId::entry(requested));
    }
    None
  }

  #[instrument(skip_all, fields(id = %internal.escape_debug()))]
  pub async fn load(
    &self,
    session: &BuildSession,
    ctx: &mut dyn PluginContext,
    internal: &str,
  ) -> BuildResult<Option<ModuleSource>> {
    let Some(id) = VirtualModuleId::parse(internal) else {
      return Ok(None);
    };
    match id.namespace() {
      IdNamespace::Entry => Ok(session.entry(id.requested()).await),
      IdNamespace::Virtual => {
        let Some(producer) = self.lookup(id.requested()) else {
          return Ok(None);
        };
        let mode = session.mode().await;
        if mode.is_production {
          if let Some(cached) = session.produced(&id).await {
            return Ok(Some(cached));
          }
        }
        self.produce(producer, session, ctx, &id).await.map(Some)
      }
    }
  }

  /// Runs the producer of `id` again regardless of the build mode and replaces what it produced before.
  pub async fn reload(
    &self,
    session: &BuildSession,
    ctx: &mut dyn PluginContext,
    id: &VirtualModuleId,
  ) -> BuildResult<ModuleSource> {
    let producer = self
      .lookup(id.requested())
      .ok_or_else(|| Error::panic(format!("no producer for \"{}\"", id.requested())))?;
    self.produce(producer, session, ctx, id).await
  }

  async fn produce(
    &self,
    producer: &Arc<dyn Producer>,
    session: &BuildSession,
    ctx: &mut dyn PluginContext,
    id: &VirtualModuleId,
  ) -> BuildResult<ModuleSource> {
    let mode = session.mode().await;
    let source = if emission::is_suppressed(producer.kind(), mode) {
      ModuleSource::null_stub()
    } else {
      let mut cx = LoadContext {
        session,
        plugin_ctx: ctx,
        id,
        mode,
      };
      producer
        .load(&mut cx)
        .await
        .map_err(|e| e.context(format!("loading \"{}\"", id.requested())))?
    };
    session.store_produced(id, source.clone()).await;
    Ok(source)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use balafon_plugin::ResolvedConfig;
  use balafon_test_utils::{FakeRunner, TestHost};

  use super::*;
  use crate::BalafonOptions;

  #[derive(Debug, Default)]
  struct Counting {
    calls: AtomicUsize,
  }

  #[async_trait::async_trait]
  impl Producer for Counting {
    fn kind(&self) -> ContentKind {
      ContentKind::Settings
    }

    async fn load(&self, cx: &mut LoadContext<'_>) -> BuildResult<ModuleSource> {
      let n = self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(ModuleSource::new(format!(
        "export default {:?}; // {n}",
        cx.requested()
      )))
    }
  }

  fn setup() -> (ProducerRegistry, Arc<Counting>, BuildSession) {
    let counting = Arc::new(Counting::default());
    let mut registry = ProducerRegistry::default();
    registry.register("virtual:test/a.js", counting.clone());
    registry.register_prefix("virtual:test/dyn/", counting.clone());
    let session = BuildSession::new(
      Arc::new(BalafonOptions::default()),
      Arc::new(FakeRunner::new()),
    );
    (registry, counting, session)
  }

  #[tokio::test]
  async fn resolve_is_idempotent_and_passes_unknown_ids_through() {
    let (registry, _, session) = setup();
    let a = registry.resolve(&session, "virtual:test/a.js").await.unwrap();
    assert_eq!(registry.resolve(&session, "virtual:test/a.js").await, Some(a.clone()));
    assert_eq!(a.requested(), "virtual:test/a.js");
    assert!(registry.resolve(&session, "virtual:test/dyn/x").await.is_some());
    assert!(registry.resolve(&session, "virtual:test/dyn/").await.is_none());
    assert!(registry.resolve(&session, "virtual:test/b.js").await.is_none());
    assert!(registry.resolve(&session, "./src/main.js").await.is_none());
  }

  #[tokio::test]
  async fn unknown_ids_are_not_loaded() {
    let (registry, counting, session) = setup();
    let mut host = TestHost::default();
    assert_eq!(registry.load(&session, &mut host, "/src/main.js").await.unwrap(), None);
    let stranger = VirtualModuleId::virtual_module("virtual:test/b.js");
    assert_eq!(registry.load(&session, &mut host, stranger.id()).await.unwrap(), None);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn production_memoizes_development_reinvokes() {
    let (registry, counting, session) = setup();
    let mut host = TestHost::default();
    let id = registry.resolve(&session, "virtual:test/a.js").await.unwrap();

    registry.load(&session, &mut host, id.id()).await.unwrap().unwrap();
    registry.load(&session, &mut host, id.id()).await.unwrap().unwrap();
    assert_eq!(counting.calls.load(Ordering::SeqCst), 2);

    session.configure(&ResolvedConfig::default()).await;
    let first = registry.load(&session, &mut host, id.id()).await.unwrap();
    let second = registry.load(&session, &mut host, id.id()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn emitted_entries_resolve_to_their_own_namespace() {
    let (registry, _, session) = setup();
    assert!(registry.resolve(&session, "balafon/core.js").await.is_none());
    session
      .register_entry("balafon/core.js", ModuleSource::new("export default 1;"))
      .await;
    let entry = registry.resolve(&session, "balafon/core.js").await.unwrap();
    assert_eq!(entry.namespace(), IdNamespace::Entry);
    let mut host = TestHost::default();
    let body = registry.load(&session, &mut host, entry.id()).await.unwrap();
    assert_eq!(body.unwrap().code, "export default 1;");
  }
}
