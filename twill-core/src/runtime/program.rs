//! Render program representation.
//!
//! A compiled template is a flat sequence of render ops. Its canonical form
//! is the line-oriented listing produced by [`Program::fmt`]; that text is
//! what a compile result carries, and [`Program::parse`] is the loader that
//! turns it back into an executable program. The listing is the contract
//! between code generation and materialization, so the loader validates
//! structure instead of trusting it.

use std::fmt;

use thiserror::Error;

/// One render instruction.
///
/// `Elem`, `If` and `For` open a block that runs until the matching `End`.
/// `Elif` and `Else` separate the arms of an `If` block. Attribute ops
/// apply to the innermost open element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    /// Open an element node.
    Elem { tag: String, ns: Option<String> },
    /// Literal attribute on the open element.
    Attr { name: String, value: String },
    /// Attribute whose value is evaluated against the scope.
    BoundAttr { name: String, expr: String },
    /// Property binding on the open element, evaluated against the scope.
    Prop { name: String, expr: String },
    /// Literal text node.
    Text { text: String },
    /// Text node produced by evaluating an expression.
    Interp { expr: String },
    /// Comment node.
    Comment { text: String },
    /// Splice the hoisted static tree with the given index.
    Static { index: usize },
    /// Open a conditional block.
    If { cond: String },
    /// Next conditional arm.
    Elif { cond: String },
    /// Final unconditional arm.
    Else,
    /// Open an iteration block. `value` names the per-item binding,
    /// `index` the optional position binding.
    For {
        expr: String,
        value: String,
        index: Option<String>,
    },
    /// Close the innermost open block.
    End,
}

/// Structural errors raised while assembling a program from its listing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("line {line}: unknown op `{op}`")]
    UnknownOp { line: usize, op: String },
    #[error("line {line}: malformed operands for `{op}`: {detail}")]
    BadOperands { line: usize, op: String, detail: String },
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },
    #[error("line {line}: `{op}` outside an element block")]
    MisplacedAttr { line: usize, op: String },
    #[error("line {line}: `{marker}` is not inside an open conditional")]
    MisplacedMarker { line: usize, marker: String },
    #[error("line {line}: `end` without an open block")]
    UnexpectedEnd { line: usize },
    #[error("block opened on line {line} is never closed")]
    UnterminatedBlock { line: usize },
    #[error("op references static tree {index} but only {count} exist")]
    StaticOutOfRange { index: usize, count: usize },
}

/// A flat render instruction sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<RenderOp>,
}

impl Program {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn push(&mut self, op: RenderOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Highest static-tree index referenced by this program, if any.
    pub fn max_static_index(&self) -> Option<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::Static { index } => Some(*index),
                _ => None,
            })
            .max()
    }

    /// Parse a listing back into a program, validating block structure.
    ///
    /// Empty lines are skipped and leading indentation is ignored, so the
    /// pretty-printed form and a hand-trimmed form load identically.
    pub fn parse(source: &str) -> Result<Self, ProgramError> {
        let mut ops = Vec::new();
        let mut blocks: Vec<(BlockKind, usize)> = Vec::new();

        for (idx, raw_line) in source.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (mnemonic, rest) = match trimmed.find(char::is_whitespace) {
                Some(cut) => (&trimmed[..cut], trimmed[cut..].trim_start()),
                None => (trimmed, ""),
            };
            let mut operands = Operands::new(rest, line, mnemonic);
            let op = match mnemonic {
                "elem" => {
                    let tag = operands.bare("tag")?.to_string();
                    let ns = operands.maybe_bare().map(str::to_string);
                    RenderOp::Elem { tag, ns }
                }
                "attr" => RenderOp::Attr {
                    name: operands.bare("name")?.to_string(),
                    value: operands.quoted("value")?,
                },
                "battr" => RenderOp::BoundAttr {
                    name: operands.bare("name")?.to_string(),
                    expr: operands.quoted("expression")?,
                },
                "prop" => RenderOp::Prop {
                    name: operands.bare("name")?.to_string(),
                    expr: operands.quoted("expression")?,
                },
                "text" => RenderOp::Text {
                    text: operands.quoted("text")?,
                },
                "interp" => RenderOp::Interp {
                    expr: operands.quoted("expression")?,
                },
                "comment" => RenderOp::Comment {
                    text: operands.quoted("text")?,
                },
                "static" => {
                    let token = operands.bare("index")?;
                    let index = token.parse::<usize>().map_err(|_| {
                        ProgramError::BadOperands {
                            line,
                            op: "static".to_string(),
                            detail: format!("`{token}` is not an index"),
                        }
                    })?;
                    RenderOp::Static { index }
                }
                "if" => RenderOp::If {
                    cond: operands.quoted("condition")?,
                },
                "elif" => RenderOp::Elif {
                    cond: operands.quoted("condition")?,
                },
                "else" => RenderOp::Else,
                "for" => {
                    let expr = operands.quoted("expression")?;
                    let value = operands.bare("binding")?.to_string();
                    let index = operands.maybe_bare().map(str::to_string);
                    RenderOp::For { expr, value, index }
                }
                "end" => RenderOp::End,
                other => {
                    return Err(ProgramError::UnknownOp {
                        line,
                        op: other.to_string(),
                    })
                }
            };
            operands.finish()?;
            check_structure(&op, &mut blocks, line)?;
            ops.push(op);
        }

        if let Some((_, line)) = blocks.last() {
            return Err(ProgramError::UnterminatedBlock { line: *line });
        }
        Ok(Self { ops })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Elem,
    If { saw_else: bool },
    For,
}

fn check_structure(
    op: &RenderOp,
    blocks: &mut Vec<(BlockKind, usize)>,
    line: usize,
) -> Result<(), ProgramError> {
    match op {
        RenderOp::Elem { .. } => blocks.push((BlockKind::Elem, line)),
        RenderOp::If { .. } => blocks.push((BlockKind::If { saw_else: false }, line)),
        RenderOp::For { .. } => blocks.push((BlockKind::For, line)),
        RenderOp::Attr { .. } | RenderOp::BoundAttr { .. } | RenderOp::Prop { .. } => {
            if !matches!(blocks.last(), Some((BlockKind::Elem, _))) {
                return Err(ProgramError::MisplacedAttr {
                    line,
                    op: mnemonic_of(op).to_string(),
                });
            }
        }
        RenderOp::Elif { .. } | RenderOp::Else => {
            let marker = mnemonic_of(op);
            match blocks.last_mut() {
                Some((BlockKind::If { saw_else }, _)) if !*saw_else => {
                    if matches!(op, RenderOp::Else) {
                        *saw_else = true;
                    }
                }
                _ => {
                    return Err(ProgramError::MisplacedMarker {
                        line,
                        marker: marker.to_string(),
                    })
                }
            }
        }
        RenderOp::End => {
            if blocks.pop().is_none() {
                return Err(ProgramError::UnexpectedEnd { line });
            }
        }
        RenderOp::Text { .. }
        | RenderOp::Interp { .. }
        | RenderOp::Comment { .. }
        | RenderOp::Static { .. } => {}
    }
    Ok(())
}

fn mnemonic_of(op: &RenderOp) -> &'static str {
    match op {
        RenderOp::Elem { .. } => "elem",
        RenderOp::Attr { .. } => "attr",
        RenderOp::BoundAttr { .. } => "battr",
        RenderOp::Prop { .. } => "prop",
        RenderOp::Text { .. } => "text",
        RenderOp::Interp { .. } => "interp",
        RenderOp::Comment { .. } => "comment",
        RenderOp::Static { .. } => "static",
        RenderOp::If { .. } => "if",
        RenderOp::Elif { .. } => "elif",
        RenderOp::Else => "else",
        RenderOp::For { .. } => "for",
        RenderOp::End => "end",
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0usize;
        for op in &self.ops {
            let printed_depth = match op {
                RenderOp::End | RenderOp::Elif { .. } | RenderOp::Else => {
                    depth.saturating_sub(1)
                }
                _ => depth,
            };
            for _ in 0..printed_depth {
                f.write_str("  ")?;
            }
            write_op(f, op)?;
            f.write_str("\n")?;
            match op {
                RenderOp::Elem { .. } | RenderOp::If { .. } | RenderOp::For { .. } => depth += 1,
                RenderOp::End => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Ok(())
    }
}

fn write_op(f: &mut fmt::Formatter<'_>, op: &RenderOp) -> fmt::Result {
    match op {
        RenderOp::Elem { tag, ns } => {
            write!(f, "elem {tag}")?;
            if let Some(ns) = ns {
                write!(f, " {ns}")?;
            }
            Ok(())
        }
        RenderOp::Attr { name, value } => write!(f, "attr {name} {}", Quoted(value)),
        RenderOp::BoundAttr { name, expr } => write!(f, "battr {name} {}", Quoted(expr)),
        RenderOp::Prop { name, expr } => write!(f, "prop {name} {}", Quoted(expr)),
        RenderOp::Text { text } => write!(f, "text {}", Quoted(text)),
        RenderOp::Interp { expr } => write!(f, "interp {}", Quoted(expr)),
        RenderOp::Comment { text } => write!(f, "comment {}", Quoted(text)),
        RenderOp::Static { index } => write!(f, "static {index}"),
        RenderOp::If { cond } => write!(f, "if {}", Quoted(cond)),
        RenderOp::Elif { cond } => write!(f, "elif {}", Quoted(cond)),
        RenderOp::Else => f.write_str("else"),
        RenderOp::For { expr, value, index } => {
            write!(f, "for {} {value}", Quoted(expr))?;
            if let Some(index) = index {
                write!(f, " {index}")?;
            }
            Ok(())
        }
        RenderOp::End => f.write_str("end"),
    }
}

/// Double-quoted string with the loader's escape rules.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\t' => f.write_str("\\t")?,
                '\r' => f.write_str("\\r")?,
                _ => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")
    }
}

/// Cursor over one line's operand text.
struct Operands<'a> {
    rest: &'a str,
    line: usize,
    op: &'a str,
}

impl<'a> Operands<'a> {
    fn new(rest: &'a str, line: usize, op: &'a str) -> Self {
        Self { rest, line, op }
    }

    fn bad(&self, detail: String) -> ProgramError {
        ProgramError::BadOperands {
            line: self.line,
            op: self.op.to_string(),
            detail,
        }
    }

    /// Unquoted token, terminated by whitespace.
    fn bare(&mut self, what: &str) -> Result<&'a str, ProgramError> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() || self.rest.starts_with('"') {
            return Err(self.bad(format!("expected {what}")));
        }
        let cut = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let token = &self.rest[..cut];
        self.rest = &self.rest[cut..];
        Ok(token)
    }

    fn maybe_bare(&mut self) -> Option<&'a str> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() || self.rest.starts_with('"') {
            return None;
        }
        let cut = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let token = &self.rest[..cut];
        self.rest = &self.rest[cut..];
        Some(token)
    }

    /// Double-quoted string with escapes.
    fn quoted(&mut self, what: &str) -> Result<String, ProgramError> {
        self.rest = self.rest.trim_start();
        let mut chars = self.rest.char_indices();
        match chars.next() {
            Some((_, '"')) => {}
            _ => return Err(self.bad(format!("expected quoted {what}"))),
        }
        let mut out = String::new();
        let mut escaped = false;
        for (i, c) in chars {
            if escaped {
                match c {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => return Err(self.bad(format!("invalid escape `\\{other}`"))),
                }
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                self.rest = &self.rest[i + 1..];
                return Ok(out);
            } else {
                out.push(c);
            }
        }
        Err(ProgramError::UnterminatedString { line: self.line })
    }

    /// Reject trailing input after the last expected operand.
    fn finish(self) -> Result<(), ProgramError> {
        if self.rest.trim().is_empty() {
            Ok(())
        } else {
            let trailing = self.rest.trim().to_string();
            Err(self.bad(format!("unexpected trailing input `{trailing}`")))
        }
    }
}
