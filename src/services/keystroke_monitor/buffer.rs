/// Buffer state as observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Idle,
    Accumulating,
}

/// Accumulated typed characters, exclusively owned by the keystroke monitor
/// task. Single writer, single reader: no synchronization.
#[derive(Debug, Default)]
pub struct KeystrokeBuffer {
    chars: Vec<char>,
}

impl KeystrokeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        self.chars.push(c);
    }

    /// Backspace: removes the last accumulated character, if any.
    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// The accumulated characters joined as one candidate trigger word.
    pub fn word(&self) -> String {
        self.chars.iter().collect()
    }

    #[allow(dead_code)]
    pub fn state(&self) -> BufferState {
        if self.chars.is_empty() {
            BufferState::Idle
        } else {
            BufferState::Accumulating
        }
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut buffer = KeystrokeBuffer::new();
        assert_eq!(buffer.state(), BufferState::Idle);

        buffer.push('a');
        assert_eq!(buffer.state(), BufferState::Accumulating);

        buffer.pop();
        assert_eq!(buffer.state(), BufferState::Idle);
    }

    #[test]
    fn test_backspace_correctness() {
        // t, e, s, t, backspace, backspace, s, t -> "tst"
        let mut buffer = KeystrokeBuffer::new();
        for c in ['t', 'e', 's', 't'] {
            buffer.push(c);
        }
        buffer.pop();
        buffer.pop();
        buffer.push('s');
        buffer.push('t');

        assert_eq!(buffer.word(), "tst");
    }

    #[test]
    fn test_pop_on_empty_is_noop() {
        let mut buffer = KeystrokeBuffer::new();
        assert_eq!(buffer.pop(), None);
        assert_eq!(buffer.state(), BufferState::Idle);
    }

    #[test]
    fn test_clear() {
        let mut buffer = KeystrokeBuffer::new();
        buffer.push('x');
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.word(), "");
    }
}
