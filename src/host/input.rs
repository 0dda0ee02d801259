//! Input Actor: Dedicated thread for polling terminal events.
//!
//! Runs crossterm's event polling off the loop thread and forwards each
//! event, converted to an [`Event`], over a crossbeam channel. The loop
//! thread never blocks on the terminal.

use crate::game::{Event, KeyCode, KeyModifiers, MouseButton, Pointer};
use crossbeam_channel::Sender;
use crossterm::event::{self, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

/// Input actor that polls terminal events.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send input events to the loop thread.
    /// * `poll_timeout` - How long to wait for events before checking shutdown.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the input thread.
    pub fn spawn(sender: Sender<Event>, poll_timeout: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tickwheel-input".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &shutdown_clone, poll_timeout);
            })
            .expect("Failed to spawn input thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main input polling loop.
    fn run_loop(sender: &Sender<Event>, shutdown: &AtomicBool, poll_timeout: Duration) {
        while !shutdown.load(Ordering::Relaxed) {
            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(raw) => {
                        if let Some(event) = convert_event(raw) {
                            if sender.send(event).is_err() {
                                // Receiver dropped, exit
                                break;
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "terminal read failed"),
                },
                Ok(false) => {}
                Err(e) => warn!(error = %e, "terminal poll failed"),
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Convert a crossterm event to our [`Event`].
pub fn convert_event(raw: event::Event) -> Option<Event> {
    match raw {
        event::Event::Key(key) => {
            // Only presses; releases and repeats are dropped
            if key.kind != KeyEventKind::Press {
                return None;
            }
            Some(Event::Key {
                code: convert_key_code(key.code)?,
                modifiers: convert_modifiers(key.modifiers),
            })
        }
        event::Event::Mouse(mouse) => convert_mouse_event(mouse),
        event::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        event::Event::FocusGained => Some(Event::FocusIn),
        event::Event::FocusLost => Some(Event::FocusOut),
        event::Event::Paste(text) => Some(Event::Paste(text)),
    }
}

fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
    Some(match code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::F(n) => KeyCode::F(n),
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Up => KeyCode::Up,
        event::KeyCode::Down => KeyCode::Down,
        event::KeyCode::Tab => KeyCode::Tab,
        event::KeyCode::Esc => KeyCode::Esc,
        _ => return None,
    })
}

fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    out.set(KeyModifiers::SHIFT, mods.contains(event::KeyModifiers::SHIFT));
    out.set(KeyModifiers::CONTROL, mods.contains(event::KeyModifiers::CONTROL));
    out.set(KeyModifiers::ALT, mods.contains(event::KeyModifiers::ALT));
    out.set(KeyModifiers::SUPER, mods.contains(event::KeyModifiers::SUPER));
    out
}

fn convert_mouse_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::Left,
        event::MouseButton::Right => MouseButton::Right,
        event::MouseButton::Middle => MouseButton::Middle,
    }
}

fn convert_mouse_event(mouse: event::MouseEvent) -> Option<Event> {
    let (x, y) = (f64::from(mouse.column), f64::from(mouse.row));
    let pointer = |button| Pointer {
        x,
        y,
        button,
        modifiers: convert_modifiers(mouse.modifiers),
    };

    match mouse.kind {
        event::MouseEventKind::Down(b) => Some(Event::ButtonPress(pointer(Some(convert_mouse_button(b))))),
        event::MouseEventKind::Up(b) => Some(Event::ButtonRelease(pointer(Some(convert_mouse_button(b))))),
        event::MouseEventKind::Drag(b) => Some(Event::Motion(pointer(Some(convert_mouse_button(b))))),
        event::MouseEventKind::Moved => Some(Event::Motion(pointer(None))),
        event::MouseEventKind::ScrollUp => Some(Event::Scroll { x, y, delta: 1 }),
        event::MouseEventKind::ScrollDown => Some(Event::Scroll { x, y, delta: -1 }),
        _ => None,
    }
}
