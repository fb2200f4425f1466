//! Output writer with indentation tracking
//!
//! Builds Java source line by line; every line written at the start of a line gets the current indentation.

use crate::config::GeneratorConfig;

/// Writer that tracks indentation and builds formatted output
pub struct JavaWriter {
    /// The output buffer
    output: String,
    /// Current indentation level
    indent_level: usize,
    /// One level of indentation
    unit: String,
    /// Whether we're at the start of a line
    at_line_start: bool,
}

impl JavaWriter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            unit: config.indent_unit(),
            at_line_start: true,
        }
    }

    /// Get the formatted output
    pub fn finish(self) -> String {
        self.output
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn current_indent(&self) -> usize {
        self.indent_level
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.output.push_str(&self.unit);
            }
            self.at_line_start = false;
        }
    }

    /// Write a string (with auto-indent)
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    pub fn blank_lines(&mut self, count: usize) {
        for _ in 0..count {
            self.newline();
        }
    }

    /// Write pre-rendered text, indenting every non-empty line at the current level.
    pub fn write_block(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.newline();
            } else {
                self.writeln(line);
            }
        }
    }

    /// Write `lines` as a chained call: the first at the current level, the rest two levels deeper.
    pub fn write_chain(&mut self, lines: &[String], terminator: &str) {
        let Some((first, rest)) = lines.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.write(first);
            self.writeln(terminator);
            return;
        }
        self.writeln(first);
        self.indent();
        self.indent();
        for (index, line) in rest.iter().enumerate() {
            self.write(line);
            if index + 1 == rest.len() {
                self.write(terminator);
            }
            self.newline();
        }
        self.dedent();
        self.dedent();
    }
}
