//! Stack of nesting frames shared by the scanner and the splitter.
//!
//! Both passes track the same shape of nesting (a root frame plus one frame
//! per open namespace, type, function or initializer list) but care about
//! different kinds, so the stack is generic over the frame kind.

/// Counter underflow reported by [`ScopeStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underflow {
    Brace,
    Parenthesis,
}

/// One nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<K> {
    pub kind: K,
    pub name: String,
    pub braces: usize,
    pub parens: usize,
}

impl<K> Frame<K> {
    pub fn new(kind: K, name: impl Into<String>, braces: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            braces,
            parens: 0,
        }
    }
}

/// Stack of frames that always keeps its root.
#[derive(Debug, Clone)]
pub struct ScopeStack<K> {
    frames: Vec<Frame<K>>,
}

impl<K: Copy + Eq> ScopeStack<K> {
    /// Create a stack holding only a root frame of `root` kind.
    pub fn new(root: K) -> Self {
        Self {
            frames: vec![Frame::new(root, String::new(), 0)],
        }
    }

    pub fn push(&mut self, kind: K, name: impl Into<String>, braces: usize) {
        self.frames.push(Frame::new(kind, name, braces));
    }

    /// Pop the innermost frame. The root frame is never popped.
    pub fn pop(&mut self) -> Option<Frame<K>> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn top(&self) -> &Frame<K> {
        // The root frame is never removed.
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Frame<K> {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn kind(&self) -> K {
        self.top().kind
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame<K>> {
        self.frames.iter()
    }

    pub fn open_brace(&mut self) {
        self.top_mut().braces += 1;
    }

    /// Decrement the brace counter of the innermost frame, returning the
    /// remaining count.
    pub fn close_brace(&mut self) -> Result<usize, Underflow> {
        let frame = self.top_mut();
        frame.braces = frame.braces.checked_sub(1).ok_or(Underflow::Brace)?;
        Ok(frame.braces)
    }

    pub fn open_paren(&mut self) {
        self.top_mut().parens += 1;
    }

    /// Decrement the parenthesis counter of the innermost frame, returning
    /// the remaining count.
    pub fn close_paren(&mut self) -> Result<usize, Underflow> {
        let frame = self.top_mut();
        frame.parens = frame.parens.checked_sub(1).ok_or(Underflow::Parenthesis)?;
        Ok(frame.parens)
    }
}
