//! The value stack shared by PUSH/POP and CALL/RET.

/// Unbounded last-in-first-out stack of words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    values: Vec<u16>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: u16) {
        self.values.push(value);
    }

    /// Remove the top value, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<u16> {
        self.values.pop()
    }

    pub fn peek(&self) -> Option<u16> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Values from bottom to top.
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }
}
