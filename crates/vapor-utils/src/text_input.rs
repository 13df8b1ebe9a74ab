use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, warn};
use vapor_native::{GamepadTextInputDismissed, GamepadTextInputMode, GamepadTextLineMode};

use crate::Utils;

/// One process-wide keyboard; concurrent requests queue here.
static TEXT_INPUT_LOCK: Mutex<()> = Mutex::new(());

/// Options for the Big Picture gamepad keyboard.
#[derive(Debug, Clone, Default)]
pub struct TextInputRequest {
    pub password: bool,
    pub multi_line: bool,
    /// Prompt shown above the input field.
    pub description: String,
    pub max_chars: u32,
    /// Text the field starts with.
    pub existing_text: String,
}

impl TextInputRequest {
    pub fn new(description: impl Into<String>, max_chars: u32) -> Self {
        Self {
            description: description.into(),
            max_chars,
            ..Self::default()
        }
    }
}

impl Utils {
    /// Shows the gamepad keyboard and blocks until the user closes it.
    ///
    /// Returns the submitted text, or `None` if the user cancelled or the
    /// keyboard isn't available (outside Big Picture, for example).
    ///
    /// The answer arrives as a callback, so callbacks must be pumped on
    /// another thread while this waits. Calling it from the pumping thread
    /// deadlocks. Must not be called from inside an async runtime.
    pub fn gamepad_text_input(&self, request: &TextInputRequest) -> Option<String> {
        let _serial = TEXT_INPUT_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _guard = self.ctx.guard();
        let native = Arc::clone(self.ctx.native());

        let (tx, rx) = oneshot::channel::<Option<String>>();
        let reply = Mutex::new(Some(tx));
        let handler_native = Arc::clone(&native);
        let _dismissed = self.ctx.register(move |done: GamepadTextInputDismissed| {
            let Some(tx) = reply.lock().unwrap_or_else(PoisonError::into_inner).take() else {
                return;
            };
            let text = if done.submitted() {
                let text = handler_native.entered_gamepad_text(done.submitted_text_len());
                if text.is_none() {
                    warn!("gamepad text was submitted but could not be read");
                }
                text
            } else {
                None
            };
            let _ = tx.send(text);
        });

        let mode = if request.password {
            GamepadTextInputMode::Password
        } else {
            GamepadTextInputMode::Normal
        };
        let line_mode = if request.multi_line {
            GamepadTextLineMode::MultipleLines
        } else {
            GamepadTextLineMode::SingleLine
        };
        if !native.show_gamepad_text_input(
            mode,
            line_mode,
            &request.description,
            request.max_chars,
            &request.existing_text,
        ) {
            debug!("gamepad text input unavailable");
            return None;
        }

        rx.blocking_recv().ok().flatten()
    }
}
