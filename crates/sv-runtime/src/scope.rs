//! Scope lifetime management.
//!
//! A scope is the variable store of one execution flow (one scenario). The
//! caller threads either the [`ScopeHandle`] or its [`FlowContext`] through
//! the work it spawns; cloning either one is how child work inherits the
//! parent's scope. Nothing here is thread-local.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use sv_core::StepVarsError;
use tracing::debug;

use crate::interpolate::Interpolator;
use crate::options::{MissingPlaceholderPolicy, RuntimeOptions};
use crate::rng::SeededRng;
use crate::store::VariableStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Scope {
    id: ScopeId,
    store: VariableStore,
    rng: Mutex<SeededRng>,
    interpolator: Interpolator,
    ended: AtomicBool,
}

/// Shared reference to a live scope.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    scope: Arc<Scope>,
}

impl ScopeHandle {
    pub fn id(&self) -> ScopeId {
        self.scope.id
    }

    pub fn flow(&self) -> FlowContext {
        FlowContext {
            scope_id: Some(self.scope.id),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.scope.ended.load(Ordering::Acquire)
    }

    pub fn store(&self) -> Result<&VariableStore, StepVarsError> {
        if !self.is_active() {
            return Err(StepVarsError::NoActiveScope);
        }
        Ok(&self.scope.store)
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.scope.interpolator
    }

    /// Resolves `{name}` placeholders against this scope's variables.
    pub fn resolve(&self, text: &str) -> Result<String, StepVarsError> {
        self.scope.interpolator.resolve(self.store()?, text)
    }

    /// Resolves `text`, leaving placeholders with no variable behind them as
    /// literal text. Cycles and an ended scope still fail.
    pub fn resolve_or_literal(&self, text: &str) -> Result<String, StepVarsError> {
        let lenient = Interpolator::new(
            self.scope.interpolator.max_depth(),
            MissingPlaceholderPolicy::Keep,
        );
        lenient.resolve(self.store()?, text)
    }

    pub fn with_rng<R>(&self, draw: impl FnOnce(&mut SeededRng) -> R) -> Result<R, StepVarsError> {
        if !self.is_active() {
            return Err(StepVarsError::NoActiveScope);
        }
        let mut rng = lock_rng(&self.scope.rng);
        Ok(draw(&mut rng))
    }

    pub fn same_scope(&self, other: &ScopeHandle) -> bool {
        Arc::ptr_eq(&self.scope, &other.scope)
    }
}

fn lock_rng(rng: &Mutex<SeededRng>) -> MutexGuard<'_, SeededRng> {
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Execution context value threaded by callers into the work they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowContext {
    scope_id: Option<ScopeId>,
}

impl FlowContext {
    /// A context outside any flow.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn scope_id(&self) -> Option<ScopeId> {
        self.scope_id
    }
}

#[derive(Debug)]
pub struct ScopeManager {
    options: RuntimeOptions,
    scopes: DashMap<ScopeId, ScopeHandle>,
    next_id: AtomicU64,
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new(RuntimeOptions::default())
    }
}

impl ScopeManager {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            options,
            scopes: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn begin(&self) -> ScopeHandle {
        self.begin_with(&self.options)
    }

    /// Starts a scope whose interpolation and seeding follow `options`
    /// instead of the manager defaults.
    pub fn begin_with(&self, options: &RuntimeOptions) -> ScopeHandle {
        let id = ScopeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let seed = options
            .random_seed
            .unwrap_or_else(|| clock_seed(id));
        let handle = ScopeHandle {
            scope: Arc::new(Scope {
                id,
                store: VariableStore::new(),
                rng: Mutex::new(SeededRng::new(seed)),
                interpolator: Interpolator::from_options(options),
                ended: AtomicBool::new(false),
            }),
        };
        self.scopes.insert(id, handle.clone());
        debug!(scope = id.get(), seed, "began scope");
        handle
    }

    pub fn current(&self, flow: &FlowContext) -> Result<ScopeHandle, StepVarsError> {
        let id = flow.scope_id.ok_or(StepVarsError::NoActiveScope)?;
        self.scopes
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StepVarsError::NoActiveScope)
    }

    /// Discards the scope and its variables. Ending twice is a no-op.
    pub fn end(&self, handle: &ScopeHandle) {
        if handle.scope.ended.swap(true, Ordering::AcqRel) {
            return;
        }
        self.scopes.remove(&handle.id());
        handle.scope.store.close();
        debug!(scope = handle.id().get(), "ended scope");
    }

    pub fn live_scopes(&self) -> usize {
        self.scopes.len()
    }
}

fn clock_seed(id: ScopeId) -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or(0);
    nanos ^ (id.get() as u32).wrapping_mul(0x9e37_79b9)
}
