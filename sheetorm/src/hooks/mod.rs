// Lifecycle hooks - ordered async callbacks around insert and update

use crate::error::Result;
use crate::record::Record;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Where in an operation a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
}

type HookFn = Arc<dyn Fn(Record) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Registered hooks, kept in registration order per lifecycle point.
/// Registering never replaces an earlier hook.
#[derive(Clone, Default)]
pub struct Hooks {
    registered: HashMap<HookPoint, Vec<HookFn>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (point, hooks) in &self.registered {
            map.entry(point, &hooks.len());
        }
        map.finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook at `point`, after any already registered there.
    pub fn register<F, Fut>(&mut self, point: HookPoint, hook: F)
    where
        F: Fn(Record) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let hook: HookFn = Arc::new(move |data| hook(data).boxed());
        self.registered.entry(point).or_default().push(hook);
    }

    /// Number of hooks registered at `point`.
    pub fn count(&self, point: HookPoint) -> usize {
        self.registered.get(&point).map_or(0, Vec::len)
    }

    /// Run the hooks at `point` one after another, each with its own copy of
    /// `data`. The first failure stops the chain and is returned.
    pub async fn run(&self, point: HookPoint, data: &Record) -> Result<()> {
        let Some(hooks) = self.registered.get(&point) else {
            return Ok(());
        };
        for hook in hooks {
            hook(data.clone()).await?;
        }
        Ok(())
    }
}
