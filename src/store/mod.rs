//! Navigation Store
//!
//! Owns the processed forest of one section and is the only thing that
//! mutates it. Per-node state moves collapsed -> loading -> expanded, rolling
//! back to collapsed when a child fetch comes up empty. Initial load status is
//! exposed through [`NavigationStore::is_pending`] and [`NavigationStore::error`];
//! per-node status lives on the node (`loading_children`).
//!
//! The forest sits behind a `parking_lot::Mutex` that is never held across an
//! await point; network work always happens with the lock released.

pub mod registry;

pub use registry::{PrimarySource, SectionRegistry};

use crate::chain::FallbackChain;
use crate::error::NavError;
use crate::tree::node::find_node_mut;
use crate::tree::{collect_ids, exclude_known, find_node, path_to, ProcessedNode};
use crate::types::NodeId;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Lifecycle of the initial top-level load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Idle,
    Pending,
    Ready,
    /// Last attempt produced no data; the next call retries
    Failed,
}

/// What a failed child load does to the node's `expanded` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnEmpty {
    /// User-driven expand: snap back to collapsed
    Collapse,
    /// Path reveal: leave visibility alone
    Keep,
}

#[derive(Default)]
struct StoreState {
    forest: Vec<ProcessedNode>,
    error: Option<Arc<NavError>>,
}

/// Per-section navigation state
pub struct NavigationStore {
    chain: FallbackChain,
    state: Mutex<StoreState>,
    phase: watch::Sender<InitPhase>,
    revision: watch::Sender<u64>,
}

impl NavigationStore {
    pub fn new(chain: FallbackChain) -> Self {
        let (phase, _) = watch::channel(InitPhase::Idle);
        let (revision, _) = watch::channel(0);
        Self {
            chain,
            state: Mutex::new(StoreState::default()),
            phase,
            revision,
        }
    }

    pub fn section_name(&self) -> &str {
        self.chain.section_name()
    }

    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    pub fn phase(&self) -> InitPhase {
        *self.phase.borrow()
    }

    pub fn is_initialized(&self) -> bool {
        self.phase() == InitPhase::Ready
    }

    /// Initial load in flight
    pub fn is_pending(&self) -> bool {
        self.phase() == InitPhase::Pending
    }

    /// Error of the last initial load, if it failed
    pub fn error(&self) -> Option<Arc<NavError>> {
        self.state.lock().error.clone()
    }

    /// Owned copy of the root list
    pub fn items(&self) -> Vec<ProcessedNode> {
        self.state.lock().forest.clone()
    }

    /// Borrow the root list without copying it
    pub fn with_items<R>(&self, f: impl FnOnce(&[ProcessedNode]) -> R) -> R {
        f(&self.state.lock().forest)
    }

    /// Receiver that ticks every time the forest changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn touch(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Load the top-level tree once.
    ///
    /// Concurrent callers share a single fetch and all return after it
    /// settles. Once ready this is a no-op. A failed load leaves the store
    /// uninitialized with `error` set, so a later call tries again.
    pub async fn ensure_initialized(&self) {
        let claimed = self.phase.send_if_modified(|phase| match phase {
            InitPhase::Idle | InitPhase::Failed => {
                *phase = InitPhase::Pending;
                true
            }
            InitPhase::Pending | InitPhase::Ready => false,
        });

        if !claimed {
            let mut phase = self.phase.subscribe();
            if phase.wait_for(|p| *p != InitPhase::Pending).await.is_err() {
                warn!(section = %self.section_name(), "Initialization watcher closed");
            }
            return;
        }

        let mut guard = PendingGuard {
            phase: &self.phase,
            armed: true,
        };
        self.state.lock().error = None;
        self.touch();

        let nodes = self.chain.fetch_level(None).await;
        let outcome = {
            let mut state = self.state.lock();
            if nodes.is_empty() {
                state.error = Some(Arc::new(NavError::NoData {
                    section: self.section_name().to_string(),
                }));
                InitPhase::Failed
            } else {
                state.forest = nodes;
                InitPhase::Ready
            }
        };
        guard.armed = false;
        self.phase.send_replace(outcome);
        self.touch();

        match outcome {
            InitPhase::Ready => info!(section = %self.section_name(), "Navigation initialized"),
            _ => error!(section = %self.section_name(), "Navigation initialization produced no data"),
        }
    }

    /// Owned copy of the node with `id`, searching depth first
    pub fn find_by_id(&self, id: &str) -> Option<ProcessedNode> {
        let found = find_node(&self.state.lock().forest, id).cloned();
        if found.is_none() {
            debug!(section = %self.section_name(), id, "Node not in loaded tree");
        }
        found
    }

    /// Flip `expanded`; fetch children when expanding an unloaded parent.
    ///
    /// A second call while the fetch is in flight only flips visibility.
    pub async fn toggle_expand(&self, id: &str) {
        let fetch = {
            let mut state = self.state.lock();
            let Some(node) = find_node_mut(&mut state.forest, id) else {
                warn!(section = %self.section_name(), id, "Toggle on unknown node ignored");
                return;
            };
            node.expanded = !node.expanded;
            let fetch = node.expanded && node.needs_children();
            if fetch {
                node.loading_children = true;
            }
            fetch
        };
        self.touch();

        if fetch {
            self.load_children(id, OnEmpty::Collapse).await;
        }
    }

    /// Root-to-target path, loading children along unexplored branches.
    ///
    /// Every node on the path ends expanded with its children loaded. Returns
    /// `None` if the target is nowhere in the fully loaded tree.
    pub async fn reveal_path(&self, target_id: &str) -> Option<Vec<ProcessedNode>> {
        self.ensure_initialized().await;

        let known = path_to(&self.state.lock().forest, target_id);
        let path = match known {
            Some(path) => path,
            None => match self.search(target_id).await {
                Some(path) => path,
                None => {
                    warn!(section = %self.section_name(), target_id, "Reveal target not found");
                    return None;
                }
            },
        };

        for id in &path {
            let fetch = {
                let mut state = self.state.lock();
                match find_node_mut(&mut state.forest, id) {
                    Some(node) => {
                        node.expanded = true;
                        let fetch = node.needs_children();
                        if fetch {
                            node.loading_children = true;
                        }
                        fetch
                    }
                    None => false,
                }
            };
            if fetch {
                self.load_children(id, OnEmpty::Keep).await;
            }
        }
        self.touch();

        let state = self.state.lock();
        path.iter()
            .map(|id| find_node(&state.forest, id).cloned())
            .collect()
    }

    async fn search(&self, target_id: &str) -> Option<Vec<NodeId>> {
        let roots: Vec<NodeId> = self.with_items(|items| items.iter().map(|n| n.id.clone()).collect());
        for root in roots {
            if let Some(path) = self.search_from(root, target_id).await {
                return Some(path);
            }
        }
        None
    }

    /// Sequential depth-first search; one fetch at a time
    fn search_from<'a>(
        &'a self,
        id: NodeId,
        target_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Vec<NodeId>>> + Send + 'a>> {
        Box::pin(async move {
            if id == target_id {
                return Some(vec![id]);
            }

            let fetch = {
                let mut state = self.state.lock();
                let node = find_node_mut(&mut state.forest, &id)?;
                let fetch = node.needs_children();
                if fetch {
                    node.loading_children = true;
                }
                fetch
            };
            if fetch {
                self.load_children(&id, OnEmpty::Keep).await;
            }

            let children: Vec<NodeId> = {
                let state = self.state.lock();
                find_node(&state.forest, &id)
                    .map(|node| node.children.iter().map(|c| c.id.clone()).collect())
                    .unwrap_or_default()
            };
            for child in children {
                if let Some(mut rest) = self.search_from(child, target_id).await {
                    rest.insert(0, id);
                    return Some(rest);
                }
            }
            None
        })
    }

    /// Fetch and attach children of `id`, whose `loading_children` is already set.
    /// Returns whether anything was attached.
    async fn load_children(&self, id: &str, on_empty: OnEmpty) -> bool {
        let mut guard = LoadingGuard {
            store: self,
            id,
            armed: true,
        };
        let fetched = self.chain.fetch_level(Some(id)).await;
        guard.armed = false;

        let attached = {
            let mut state = self.state.lock();
            let known = collect_ids(&state.forest);
            let children = exclude_known(fetched, &known);
            match find_node_mut(&mut state.forest, id) {
                Some(node) => {
                    node.loading_children = false;
                    if children.is_empty() {
                        if on_empty == OnEmpty::Collapse {
                            node.expanded = false;
                        }
                        false
                    } else {
                        node.children = children;
                        true
                    }
                }
                None => false,
            }
        };
        self.touch();

        if attached {
            debug!(section = %self.section_name(), id, "Attached children");
        } else {
            error!(section = %self.section_name(), id, ?on_empty, "Failed to load children");
        }
        attached
    }
}

/// Returns the phase to `Idle` if an initial load is abandoned mid-flight
struct PendingGuard<'a> {
    phase: &'a watch::Sender<InitPhase>,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.phase.send_replace(InitPhase::Idle);
        }
    }
}

/// Clears `loading_children` if a child load is abandoned mid-flight
struct LoadingGuard<'a> {
    store: &'a NavigationStore,
    id: &'a str,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.store.state.lock();
        if let Some(node) = find_node_mut(&mut state.forest, self.id) {
            node.loading_children = false;
            node.expanded = false;
        }
    }
}
