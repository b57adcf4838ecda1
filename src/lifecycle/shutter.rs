//! Termination signal shared between cooperating components.
//!
//! # States
//! ```text
//! Running → Terminating: first shutdown() call, later calls are no-ops
//! Terminating → Terminated: after every pre-terminate hook has completed
//! ```
//!
//! # Design Decisions
//! - Hooks never run on the caller's stack: the cascade runs in its own task,
//!   so a hook may call `shutdown()` on any shutter (including its own) safely
//! - Pre-terminate hooks run sequentially, in registration order, except those
//!   registered with `on_terminating_first`, which jump the queue
//! - A pre-terminate hook may return a cause that replaces the terminal cause
//! - Hooks registered after the request still run, so no cascade edge is missed

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::watch;

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal cause of a component. Cloneable so every waiter observes the same value.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

type PreTerminateHook = Box<dyn FnOnce(Option<Cause>) -> BoxFuture<'static, Option<Cause>> + Send>;
type PostTerminateHook = Box<dyn FnOnce(Option<Cause>) + Send>;

enum Position {
    First,
    Last,
}

fn box_pre_hook<F, Fut>(hook: F) -> PreTerminateHook
where
    F: FnOnce(Option<Cause>) -> Fut + Send + 'static,
    Fut: Future<Output = Option<Cause>> + Send + 'static,
{
    Box::new(move |cause: Option<Cause>| -> BoxFuture<'static, Option<Cause>> {
        Box::pin(hook(cause))
    })
}

/// Lifecycle phase of a component.
#[derive(Clone)]
pub enum Phase {
    Running,
    Terminating,
    Terminated(Option<Cause>),
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Running => write!(f, "Running"),
            Phase::Terminating => write!(f, "Terminating"),
            Phase::Terminated(None) => write!(f, "Terminated"),
            Phase::Terminated(Some(cause)) => write!(f, "Terminated({})", cause),
        }
    }
}

#[derive(Default)]
struct Hooks {
    requested: bool,
    cause: Option<Cause>,
    pre: Vec<PreTerminateHook>,
    post: Vec<PostTerminateHook>,
}

struct Inner {
    hooks: Mutex<Hooks>,
    phase: watch::Sender<Phase>,
}

/// A component that can be told to terminate and announces when it has finished terminating.
///
/// Cloning yields another handle on the same signal.
#[derive(Clone)]
pub struct Shutter {
    inner: Arc<Inner>,
}

impl Shutter {
    /// Create a shutter in the running phase.
    pub fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Running);
        Self {
            inner: Arc::new(Inner {
                hooks: Mutex::new(Hooks::default()),
                phase,
            }),
        }
    }

    /// Request termination with an optional cause.
    ///
    /// Only the first request counts.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, the hook cascade is spawned onto it.
    pub fn shutdown(&self, cause: Option<Cause>) {
        let (pre, post) = {
            let mut hooks = self.lock_hooks();
            if hooks.requested {
                tracing::trace!("Shutdown already requested, ignoring");
                return;
            }
            hooks.requested = true;
            hooks.cause = cause.clone();
            (std::mem::take(&mut hooks.pre), std::mem::take(&mut hooks.post))
        };

        self.inner.phase.send_replace(Phase::Terminating);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let mut cause = cause;
            for hook in pre {
                if let Some(replacement) = hook(cause.clone()).await {
                    cause = Some(replacement);
                }
            }

            inner.phase.send_replace(Phase::Terminated(cause.clone()));

            for hook in post {
                hook(cause.clone());
            }
        });
    }

    /// Register a hook that runs when termination is requested, before the shutter is terminated.
    ///
    /// The hook receives the requested cause. If it resolves to `Some`, that cause
    /// becomes the terminal cause.
    ///
    /// # Panics
    ///
    /// Panics if termination was already requested and no Tokio runtime is running.
    pub fn on_terminating<F, Fut>(&self, hook: F)
    where
        F: FnOnce(Option<Cause>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<Cause>> + Send + 'static,
    {
        self.register_pre(box_pre_hook(hook), Position::Last);
    }

    /// Like [`Shutter::on_terminating`], but the hook runs ahead of every hook
    /// registered so far, including ones the component installed itself.
    ///
    /// Hooks registered this way run in reverse registration order among themselves.
    pub fn on_terminating_first<F, Fut>(&self, hook: F)
    where
        F: FnOnce(Option<Cause>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<Cause>> + Send + 'static,
    {
        self.register_pre(box_pre_hook(hook), Position::First);
    }

    fn register_pre(&self, hook: PreTerminateHook, position: Position) {
        let late_cause = {
            let mut hooks = self.lock_hooks();
            if !hooks.requested {
                match position {
                    Position::First => hooks.pre.insert(0, hook),
                    Position::Last => hooks.pre.push(hook),
                }
                return;
            }
            hooks.cause.clone()
        };

        tokio::spawn(async move {
            hook(late_cause).await;
        });
    }

    /// Register a hook that runs once the shutter is terminated.
    ///
    /// # Panics
    ///
    /// Panics if termination was already requested and no Tokio runtime is running.
    pub fn on_terminated<F>(&self, hook: F)
    where
        F: FnOnce(Option<Cause>) + Send + 'static,
    {
        {
            let mut hooks = self.lock_hooks();
            if !hooks.requested {
                hooks.post.push(Box::new(hook));
                return;
            }
        }

        let shutter = self.clone();
        tokio::spawn(async move {
            let cause = shutter.terminated().await;
            hook(cause);
        });
    }

    /// Notification handle that fires when termination is requested.
    pub fn terminating(&self) -> Terminating {
        Terminating {
            rx: self.inner.phase.subscribe(),
        }
    }

    /// Wait until the shutter is terminated and return its terminal cause.
    pub async fn terminated(&self) -> Option<Cause> {
        let mut rx = self.inner.phase.subscribe();
        let phase = match rx.wait_for(|phase| matches!(phase, Phase::Terminated(_))).await {
            Ok(phase) => phase.clone(),
            // The sender lives as long as `self`.
            Err(_) => return None,
        };

        match phase {
            Phase::Terminated(cause) => cause,
            _ => None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.inner.phase.borrow().clone()
    }

    pub fn is_terminating(&self) -> bool {
        !matches!(*self.inner.phase.borrow(), Phase::Running)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(*self.inner.phase.borrow(), Phase::Terminated(_))
    }

    fn lock_hooks(&self) -> std::sync::MutexGuard<'_, Hooks> {
        // Hooks are only moved in or out under the lock, a poisoned guard is still consistent.
        self.inner.hooks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Shutter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Shutter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shutter").field("phase", &self.phase()).finish()
    }
}

/// Receiving side of a shutter's "terminating" notification.
#[derive(Clone)]
pub struct Terminating {
    rx: watch::Receiver<Phase>,
}

impl Terminating {
    /// Resolve once termination has been requested (immediately if it already was).
    pub async fn notified(&mut self) {
        let _ = self
            .rx
            .wait_for(|phase| !matches!(phase, Phase::Running))
            .await;
    }

    pub fn is_terminating(&self) -> bool {
        !matches!(*self.rx.borrow(), Phase::Running)
    }
}

/// Wrap any error into a terminal cause.
pub fn cause<E>(err: E) -> Cause
where
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(err)
}
