//! Test doubles for the platform traits.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;

use crate::config::EmbedConfig;
use crate::context::EmbedContext;
use crate::memory::{MemoryDom, NodeId};
use crate::node::NodeSpec;
use crate::platform::{PlatformError, ViewportObserver, WidgetHost};

/// Observer that only records which nodes are currently observed.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    observed: RefCell<Vec<NodeId>>,
    unobserve_calls: Cell<usize>,
}

impl RecordingObserver {
    pub(crate) fn observed(&self) -> Vec<NodeId> {
        self.observed.borrow().clone()
    }

    pub(crate) fn unobserve_calls(&self) -> usize {
        self.unobserve_calls.get()
    }
}

impl ViewportObserver for RecordingObserver {
    type Node = NodeId;

    fn observe(&self, node: &NodeId) {
        self.observed.borrow_mut().push(*node);
    }

    fn unobserve(&self, node: &NodeId) {
        self.unobserve_calls.set(self.unobserve_calls.get() + 1);
        self.observed.borrow_mut().retain(|n| n != node);
    }
}

/// Widget host whose script load is completed by hand.
#[derive(Default)]
pub(crate) struct FakeWidgets {
    available: Cell<bool>,
    fail: Cell<bool>,
    injected: RefCell<Vec<String>>,
    pending: RefCell<Vec<oneshot::Sender<()>>>,
    rendered: RefCell<Vec<NodeId>>,
}

impl FakeWidgets {
    pub(crate) fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub(crate) fn fail_injection(&self) {
        self.fail.set(true);
    }

    /// Fire the load event for every injected script.
    pub(crate) fn finish_loading(&self) {
        self.available.set(true);
        for tx in self.pending.borrow_mut().drain(..) {
            let _ = tx.send(());
        }
    }

    /// Fire the load event without the global ever showing up.
    pub(crate) fn finish_loading_broken(&self) {
        for tx in self.pending.borrow_mut().drain(..) {
            let _ = tx.send(());
        }
    }

    pub(crate) fn injections(&self) -> usize {
        self.injected.borrow().len()
    }

    pub(crate) fn injected_sources(&self) -> Vec<String> {
        self.injected.borrow().clone()
    }

    pub(crate) fn rendered(&self) -> Vec<NodeId> {
        self.rendered.borrow().clone()
    }
}

impl WidgetHost for FakeWidgets {
    type Node = NodeId;

    fn widgets_available(&self) -> bool {
        self.available.get()
    }

    fn inject_script(&self, src: &str) -> Result<LocalBoxFuture<'static, ()>, PlatformError> {
        self.injected.borrow_mut().push(src.to_owned());
        if self.fail.get() {
            return Err("document has no head".into());
        }
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(tx);
        Ok(async move {
            let _ = rx.await;
        }
        .boxed_local())
    }

    fn load_widgets(&self, node: &NodeId) -> bool {
        if !self.available.get() {
            return false;
        }
        self.rendered.borrow_mut().push(*node);
        true
    }
}

pub(crate) type TestContext = EmbedContext<MemoryDom, RecordingObserver, FakeWidgets>;

/// A context over a `MemoryDom`, driven by a local executor.
pub(crate) struct Harness {
    pub(crate) pool: LocalPool,
    pub(crate) ctx: Rc<TestContext>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(EmbedConfig::default())
    }

    pub(crate) fn with_config(config: EmbedConfig) -> Self {
        let pool = LocalPool::new();
        let ctx = EmbedContext::new(
            config,
            MemoryDom::new(),
            RecordingObserver::default(),
            Rc::new(FakeWidgets::default()),
            Box::new(pool.spawner()),
        )
        .expect("valid config");
        Self { pool, ctx }
    }

    pub(crate) fn dom(&self) -> &MemoryDom {
        self.ctx.dom()
    }

    pub(crate) fn widgets(&self) -> &FakeWidgets {
        self.ctx.widgets()
    }

    pub(crate) fn observer(&self) -> &RecordingObserver {
        self.ctx.watcher().observer()
    }

    pub(crate) fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    /// A cooked post holding one onebox per href, attached to the body.
    pub(crate) fn post(&self, hrefs: &[&str]) -> NodeId {
        let mut post = NodeSpec::new("div").class("cooked");
        for href in hrefs {
            post = post.child(
                NodeSpec::new("aside").class("onebox").child(
                    NodeSpec::new("header")
                        .class("source")
                        .child(NodeSpec::new("a").attr("href", *href).text(*href)),
                ),
            );
        }
        let root = self.dom().build(&post);
        self.dom().append(self.dom().body(), root);
        root
    }
}
