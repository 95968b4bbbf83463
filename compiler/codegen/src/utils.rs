// codegen/src/utils.rs

use crate::generators::doc_comment::DocGenerator;
use crate::Result;

/// Indentation unit of generated modules.
pub const INDENT: &str = "  ";

/// Line-oriented writer for JavaScript source.
///
/// `open` appends ` {` and indents; `close` dedents and writes `}`.
#[derive(Debug, Default)]
pub struct JsWriter {
    out: String,
    depth: usize,
}

impl JsWriter {
    /// Empty writer at depth zero.
    pub fn new() -> Self { Self::default() }

    /// Current indentation prefix.
    pub fn indent(&self) -> String { INDENT.repeat(self.depth) }

    /// Writes one line at the current depth.
    pub fn line(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            self.out.push('\n');
        } else {
            self.out.push_str(&self.indent());
            self.out.push_str(text);
            self.out.push('\n');
        }
        self
    }

    /// Writes every line of `text` at the current depth.
    pub fn lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.line(line);
        }
        self
    }

    /// Writes an empty line.
    pub fn blank(&mut self) -> &mut Self { self.line("") }

    /// Writes `head {` and indents.
    pub fn open(&mut self, head: &str) -> &mut Self {
        self.line(&format!("{} {{", head));
        self.depth += 1;
        self
    }

    /// Dedents and writes `}`.
    pub fn close(&mut self) -> &mut Self { self.close_with("}") }

    /// Dedents and writes `tail`, e.g. `});`.
    pub fn close_with(&mut self, tail: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(tail)
    }

    /// Writes the doc block for `method` at the current depth.
    pub fn doc(&mut self, docs: &mut DocGenerator, method: &str) -> Result<&mut Self> {
        let block = docs.build_block(method, &self.indent())?;
        self.out.push_str(&block);
        Ok(self)
    }

    /// Appends pre-indented text verbatim.
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.out.push_str(text);
        self
    }

    /// Finished source.
    pub fn finish(self) -> String { self.out }
}

/// Comma-joined names: `a, b, c`.
pub fn name_list(names: &[String]) -> String { names.join(", ") }

/// Array literal of names: `[a, b, c]`.
pub fn array_literal(names: &[String]) -> String { format!("[{}]", names.join(", ")) }

/// Names with `suffix` appended to each.
pub fn suffixed(names: &[String], suffix: &str) -> Vec<String> {
    names.iter().map(|n| format!("{}{}", n, suffix)).collect()
}

/// JavaScript string literal for `text`.
pub fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text.escape_default()))
}

/// Concatenates name lists in order.
pub fn concat(parts: &[&[String]]) -> Vec<String> {
    parts.iter().flat_map(|p| p.iter().cloned()).collect()
}
