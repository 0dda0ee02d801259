//! Error types shared across the crate.

use crate::entity::EntityId;
use crate::game::EventKind;
use crate::surface::{ShapeId, SubscriptionId};
use thiserror::Error;

/// Boxed error raised from inside a user hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the loop scheduler, its surfaces and its hosts.
#[derive(Debug, Error)]
pub enum Error {
    /// `ticks_per_second` was zero, negative or not finite.
    #[error("ticks_per_second must be a positive finite number, got {0}")]
    InvalidTickRate(f64),

    /// `frames_per_second` was zero, negative or not finite.
    #[error("frames_per_second must be a positive finite number, got {0}")]
    InvalidFrameRate(f64),

    /// `max_frameskip` was below one.
    #[error("max_frameskip must be at least 1, got {0}")]
    InvalidFrameskip(u32),

    /// `start()` was called while the loop was already running.
    #[error("loop is already running")]
    AlreadyRunning,

    /// The entity is not part of the scheduler's collection.
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// No listener is registered for this event kind.
    #[error("no listener registered for {0:?}")]
    ListenerNotFound(EventKind),

    /// The surface has no shape with this handle.
    #[error("shape {0} not found")]
    ShapeNotFound(ShapeId),

    /// The surface has no binding with this handle.
    #[error("subscription {0} not found")]
    SubscriptionNotFound(SubscriptionId),

    /// A user hook failed. Fatal to the tick in progress.
    #[error("hook failed: {0}")]
    Hook(#[source] HookError),

    /// Terminal I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an arbitrary error raised inside an entity or game hook.
    pub fn hook<E>(err: E) -> Self
    where
        E: Into<HookError>,
    {
        Self::Hook(err.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
