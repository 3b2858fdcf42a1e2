//! One-shot loading of the widget script.
//!
//! `ensure_loaded` hands out futures that all resolve from the same load
//! event. The script tag is injected at most once per loader, however many
//! callers are waiting and whether or not the load ever finishes.

use std::cell::RefCell;
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture, Shared};

use crate::platform::WidgetHost;

enum LoadState {
    Unloaded,
    Loading(Shared<LocalBoxFuture<'static, ()>>),
    Ready,
}

pub struct ScriptLoader<H> {
    host: Rc<H>,
    src: String,
    state: Rc<RefCell<LoadState>>,
}

impl<H: WidgetHost> ScriptLoader<H> {
    pub fn new(host: Rc<H>, src: impl Into<String>) -> Self {
        Self {
            host,
            src: src.into(),
            state: Rc::new(RefCell::new(LoadState::Unloaded)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Ready)
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Loading(_))
    }

    /// Future that resolves once the widget script is available.
    ///
    /// Never resolves if the script never loads; there is no timeout.
    pub fn ensure_loaded(&self) -> LocalBoxFuture<'static, ()> {
        match &*self.state.borrow() {
            LoadState::Ready => return future::ready(()).boxed_local(),
            LoadState::Loading(pending) => return pending.clone().boxed_local(),
            LoadState::Unloaded => {}
        }

        if self.host.widgets_available() {
            tracing::debug!("widget script already present");
            *self.state.borrow_mut() = LoadState::Ready;
            return future::ready(()).boxed_local();
        }

        let load = match self.host.inject_script(&self.src) {
            Ok(load) => {
                tracing::info!(src = %self.src, "injected widget script");
                load
            }
            Err(err) => {
                // Stay in Loading so nobody injects a second tag.
                tracing::warn!(src = %self.src, %err, "failed to inject widget script");
                future::pending().boxed_local()
            }
        };

        let state = Rc::clone(&self.state);
        let pending = async move {
            load.await;
            tracing::debug!("widget script loaded");
            *state.borrow_mut() = LoadState::Ready;
        }
        .boxed_local()
        .shared();

        *self.state.borrow_mut() = LoadState::Loading(pending.clone());
        pending.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;

    use super::*;
    use crate::testing::FakeWidgets;

    const SRC: &str = "https://platform.twitter.com/widgets.js";

    #[test]
    fn test_concurrent_waiters_share_one_injection() {
        let host = Rc::new(FakeWidgets::default());
        let loader = ScriptLoader::new(Rc::clone(&host), SRC);
        let mut pool = LocalPool::new();
        let done = Rc::new(RefCell::new(0));

        for _ in 0..2 {
            let ready = loader.ensure_loaded();
            let done = Rc::clone(&done);
            pool.spawner()
                .spawn_local(async move {
                    ready.await;
                    *done.borrow_mut() += 1;
                })
                .unwrap();
        }
        pool.run_until_stalled();

        assert_eq!(host.injections(), 1);
        assert_eq!(*done.borrow(), 0);
        assert!(loader.is_loading());

        host.finish_loading();
        pool.run_until_stalled();

        assert_eq!(*done.borrow(), 2);
        assert!(loader.is_ready());
        assert_eq!(host.injections(), 1);
        assert_eq!(host.injected_sources(), vec![SRC.to_string()]);
    }

    #[test]
    fn test_existing_global_skips_injection() {
        let host = Rc::new(FakeWidgets::default());
        host.set_available(true);
        let loader = ScriptLoader::new(Rc::clone(&host), SRC);

        assert!(loader.ensure_loaded().now_or_never().is_some());
        assert!(loader.is_ready());
        assert_eq!(host.injections(), 0);
    }

    #[test]
    fn test_ready_after_load_resolves_immediately() {
        let host = Rc::new(FakeWidgets::default());
        let loader = ScriptLoader::new(Rc::clone(&host), SRC);
        let mut pool = LocalPool::new();

        let first = loader.ensure_loaded();
        host.finish_loading();
        pool.run_until(first);

        assert!(loader.ensure_loaded().now_or_never().is_some());
        assert_eq!(host.injections(), 1);
    }

    #[test]
    fn test_failed_injection_never_retries() {
        let host = Rc::new(FakeWidgets::default());
        host.fail_injection();
        let loader = ScriptLoader::new(Rc::clone(&host), SRC);

        assert!(loader.ensure_loaded().now_or_never().is_none());
        assert!(loader.ensure_loaded().now_or_never().is_none());
        assert!(loader.is_loading());
        assert_eq!(host.injections(), 1);
    }
}
