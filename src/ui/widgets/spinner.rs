//! Animated spinner widget

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Braille spinner; `state` comes from the app tick counter
pub struct Spinner {
    state: usize,
}

impl Spinner {
    pub fn new(state: usize) -> Self {
        Self { state }
    }

    pub fn char(&self) -> char {
        SPINNER_CHARS[self.state % SPINNER_CHARS.len()]
    }
}
