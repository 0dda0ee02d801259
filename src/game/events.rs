//! Input events, the per-tick event buffer and the listener registry.
//!
//! Events arrive from the host at arbitrary times between ticks. While the
//! loop is running and a listener for the event's kind exists, they are
//! appended to the [`EventQueue`]; the next update tick hands the whole
//! ordered sequence to every update hook and then empties the queue.

use crate::error::{Error, Result};
use crate::surface::{Surface, SubscriptionId};
use bitflags::bitflags;
use std::collections::BTreeMap;
use tracing::debug;

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0001;
        /// Control key.
        const CONTROL = 0b0010;
        /// Alt/Option key.
        const ALT = 0b0100;
        /// Super/Command/Windows key.
        const SUPER = 0b1000;
    }
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
}

/// Pointer position and state, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Button involved, if any.
    pub button: Option<MouseButton>,
    /// Modifiers held.
    pub modifiers: KeyModifiers,
}

impl Pointer {
    /// A pointer at `(x, y)` with the given button and no modifiers.
    pub const fn at(x: f64, y: f64, button: Option<MouseButton>) -> Self {
        Self {
            x,
            y,
            button,
            modifiers: KeyModifiers::empty(),
        }
    }
}

/// An input record captured from the host surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A key was pressed.
    Key {
        /// The key code.
        code: KeyCode,
        /// Modifiers held during the keypress.
        modifiers: KeyModifiers,
    },
    /// A mouse button went down.
    ButtonPress(Pointer),
    /// A mouse button went up.
    ButtonRelease(Pointer),
    /// The pointer moved, with or without a button held.
    Motion(Pointer),
    /// Scroll wheel.
    Scroll {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Positive = up, negative = down.
        delta: i16,
    },
    /// The surface changed size.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
    /// The surface gained input focus.
    FocusIn,
    /// The surface lost input focus.
    FocusOut,
    /// Bracketed paste.
    Paste(String),
}

impl Event {
    /// Convenience constructor for an unmodified key press.
    pub const fn key(code: KeyCode) -> Self {
        Self::Key {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// The key code of a key press.
    pub const fn key_code(&self) -> Option<KeyCode> {
        match self {
            Self::Key { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The listener key this event is delivered under.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Key { .. } => EventKind::Key,
            Self::ButtonPress(_) => EventKind::ButtonPress,
            Self::ButtonRelease(_) => EventKind::ButtonRelease,
            Self::Motion(_) => EventKind::Motion,
            Self::Scroll { .. } => EventKind::Scroll,
            Self::Resize { .. } => EventKind::Resize,
            Self::FocusIn | Self::FocusOut => EventKind::Focus,
            Self::Paste(_) => EventKind::Paste,
        }
    }

    /// Surface position carried by pointer-like events.
    pub const fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::ButtonPress(p) | Self::ButtonRelease(p) | Self::Motion(p) => Some((p.x, p.y)),
            Self::Scroll { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}

/// The kinds of event a listener can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Key presses.
    Key,
    /// Mouse button down.
    ButtonPress,
    /// Mouse button up.
    ButtonRelease,
    /// Pointer motion.
    Motion,
    /// Scroll wheel.
    Scroll,
    /// Surface resize.
    Resize,
    /// Focus in/out.
    Focus,
    /// Bracketed paste.
    Paste,
}

/// Events buffered since the previous update tick, in arrival order.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append one event.
    #[inline]
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Take every buffered event, leaving the queue empty.
    #[inline]
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Drop every buffered event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drop the buffered events of one kind, keeping the rest in order.
    pub fn discard_kind(&mut self, kind: EventKind) {
        self.events.retain(|event| event.kind() != kind);
    }

    /// Number of buffered events.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Buffered events, oldest first.
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }
}

/// Registered listeners: event kind to the surface binding that feeds it.
#[derive(Debug, Default)]
pub struct Listeners {
    bindings: BTreeMap<EventKind, SubscriptionId>,
}

impl Listeners {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind `kind` on the surface. Binding an already bound kind returns the
    /// existing subscription.
    pub fn add(&mut self, surface: &mut dyn Surface, kind: EventKind) -> SubscriptionId {
        if let Some(&sub) = self.bindings.get(&kind) {
            return sub;
        }
        let sub = surface.bind_event(kind);
        debug!(?kind, %sub, "listener bound");
        self.bindings.insert(kind, sub);
        sub
    }

    /// Unbind `kind` from the surface.
    pub fn remove(&mut self, surface: &mut dyn Surface, kind: EventKind) -> Result<()> {
        let sub = self
            .bindings
            .remove(&kind)
            .ok_or(Error::ListenerNotFound(kind))?;
        debug!(?kind, %sub, "listener unbound");
        surface.unbind_event(sub)
    }

    /// Unbind everything. Every binding is released even if one fails; the
    /// first failure is returned.
    pub fn clear(&mut self, surface: &mut dyn Surface) -> Result<()> {
        let mut first_err = None;
        for (kind, sub) in std::mem::take(&mut self.bindings) {
            debug!(?kind, %sub, "listener unbound");
            if let Err(e) = surface.unbind_event(sub) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Whether events of `kind` are being listened for.
    #[inline]
    pub fn accepts(&self, kind: EventKind) -> bool {
        self.bindings.contains_key(&kind)
    }

    /// Subscription handle for `kind`, if bound.
    pub fn subscription(&self, kind: EventKind) -> Option<SubscriptionId> {
        self.bindings.get(&kind).copied()
    }

    /// Number of bound kinds.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
