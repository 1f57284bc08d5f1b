//! Selector string parser
//!
//! Scans the selector one character at a time. Spaces and line breaks
//! separate field tokens (a tab does not), `name{ ... }` opens a group and
//! `a.b.c` is shorthand for nested groups. Anything inside `[...]` is literal
//! text belonging to the current token.

use crate::error::{Result, SelectError};
use crate::select::selector::{Pick, Selector, SelectorBuilder};

/// Parse a selector string into an address-indexed [`Selector`]
pub fn parse(dsl: &str) -> Result<Selector> {
    Parser::new(dsl).run()
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r')
}

/// Split buffered text into tokens, keeping bracketed text intact
fn tokens(buffer: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in buffer.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ => {}
        }

        if is_separator(c) && depth == 0 {
            if let Some(s) = start.take() {
                tokens.push(&buffer[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        tokens.push(&buffer[s..]);
    }

    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Brace,
    Dot,
}

#[derive(Debug)]
struct Frame {
    /// Address segment; empty for a bare `{ ... }` group
    segment: String,
    kind: FrameKind,
    position: usize,
}

struct Parser<'a> {
    input: &'a str,
    buffer: String,
    frames: Vec<Frame>,
    address: String,
    bracket_depth: usize,
    /// Whitespace followed a dot chain; the next token ends the chain
    chain_pending: bool,
    builder: SelectorBuilder,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            buffer: String::new(),
            frames: Vec::new(),
            address: String::new(),
            bracket_depth: 0,
            chain_pending: false,
            builder: SelectorBuilder::default(),
        }
    }

    fn run(mut self) -> Result<Selector> {
        let input = self.input;
        for (pos, c) in input.char_indices() {
            if self.bracket_depth > 0 {
                match c {
                    '[' => self.bracket_depth += 1,
                    ']' => self.bracket_depth -= 1,
                    _ => {}
                }
                self.buffer.push(c);
                continue;
            }

            match c {
                '{' => {
                    self.chain_pending = false;
                    self.open(pos, FrameKind::Brace)?;
                }
                '.' => {
                    self.chain_pending = false;
                    self.open(pos, FrameKind::Dot)?;
                }
                '}' => self.close_group(pos)?,
                c if is_separator(c) => {
                    if self.in_chain() {
                        self.chain_pending = true;
                    }
                    self.buffer.push(c);
                }
                c => {
                    self.end_pending_chain()?;
                    if c == '[' {
                        self.bracket_depth = 1;
                    }
                    self.buffer.push(c);
                }
            }
        }

        self.finish()
    }

    fn in_chain(&self) -> bool {
        matches!(self.frames.last(), Some(frame) if frame.kind == FrameKind::Dot)
    }

    /// `{` or `.`: buffered siblings become fields, the last token becomes the group
    fn open(&mut self, pos: usize, kind: FrameKind) -> Result<()> {
        let buffer = std::mem::take(&mut self.buffer);
        let mut names = tokens(&buffer);
        let group = names.pop().unwrap_or("");

        for name in names {
            self.builder.push(&self.address, Pick::field(name)?);
        }

        if group.is_empty() && kind == FrameKind::Dot {
            return Err(SelectError::malformed(pos, "expected a field name before '.'"));
        }

        if !group.is_empty() {
            self.builder.push(&self.address, Pick::descend(group)?);
        }

        self.frames.push(Frame {
            segment: group.to_string(),
            kind,
            position: pos,
        });
        self.refresh_address();
        Ok(())
    }

    /// `}`: flush, close any chain inside the group, the group itself, and a
    /// chain that led into it
    fn close_group(&mut self, pos: usize) -> Result<()> {
        self.flush()?;
        self.chain_pending = false;
        self.pop_chain();

        match self.frames.pop() {
            Some(frame) if frame.kind == FrameKind::Brace => {}
            _ => return Err(SelectError::malformed(pos, "unexpected '}'")),
        }

        self.pop_chain();
        self.refresh_address();
        Ok(())
    }

    fn end_pending_chain(&mut self) -> Result<()> {
        if self.chain_pending {
            self.chain_pending = false;
            self.flush()?;
            self.pop_chain();
            self.refresh_address();
        }
        Ok(())
    }

    fn pop_chain(&mut self) {
        while self.in_chain() {
            self.frames.pop();
        }
    }

    /// Register every buffered token as a field at the current address
    fn flush(&mut self) -> Result<()> {
        let buffer = std::mem::take(&mut self.buffer);
        for name in tokens(&buffer) {
            self.builder.push(&self.address, Pick::field(name)?);
        }
        Ok(())
    }

    fn refresh_address(&mut self) {
        self.address = self
            .frames
            .iter()
            .filter(|frame| !frame.segment.is_empty())
            .map(|frame| frame.segment.as_str())
            .collect::<Vec<_>>()
            .join(".");
    }

    fn finish(mut self) -> Result<Selector> {
        let dangling = tokens(&self.buffer).is_empty();
        self.flush()?;

        if let Some(frame) = self.frames.iter().find(|f| f.kind == FrameKind::Brace) {
            return Err(SelectError::malformed(frame.position, "unclosed '{'"));
        }

        if dangling {
            if let Some(frame) = self.frames.last() {
                return Err(SelectError::malformed(frame.position, "dangling '.'"));
            }
        }

        Ok(self.builder.build())
    }
}
