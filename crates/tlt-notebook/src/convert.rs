//! Notebook → executable Python script.
//!
//! The output follows the layout of Jupyter's script exporter: a shebang
//! header, an `# In[N]:` marker before every code cell and markdown cells as
//! comments. IPython-only syntax (`%magic`, `%%cell_magic`, `!shell`) is
//! rewritten into the equivalent `get_ipython()` calls, so the script runs
//! under `ipython`.

use std::sync::OnceLock;

use regex::Regex;

use crate::document::{Cell, Notebook};

pub const SCRIPT_HEADER: &str = "#!/usr/bin/env python\n# coding: utf-8\n";

const PYTHON_RAW_FORMATS: &[&str] = &["text/x-python", "python"];

/// Convert `notebook` to script text, dropping every cell tagged with one of `strip_tags`.
pub fn to_script(notebook: &Notebook, strip_tags: &[String]) -> String {
    let mut out = String::from(SCRIPT_HEADER);
    let mut stripped = 0usize;

    for cell in &notebook.cells {
        if !strip_tags.is_empty() && cell.has_any_tag(strip_tags) {
            stripped += 1;
            continue;
        }
        match cell {
            Cell::Code {
                execution_count, ..
            } => {
                let label = execution_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| " ".to_string());
                out.push_str(&format!("\n# In[{}]:\n\n\n", label));
                out.push_str(translate_ipython(&cell.source()).trim_end());
                out.push_str("\n\n");
            }
            Cell::Markdown { .. } => {
                let source = cell.source();
                let source = source.trim_end();
                if source.is_empty() {
                    continue;
                }
                out.push('\n');
                for line in source.lines() {
                    if line.is_empty() {
                        out.push_str("#\n");
                    } else {
                        out.push_str("# ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                out.push('\n');
            }
            Cell::Raw { metadata, .. } => {
                let format = metadata.format.as_deref().or(metadata.raw_mimetype.as_deref());
                if format.is_some_and(|f| PYTHON_RAW_FORMATS.contains(&f)) {
                    out.push('\n');
                    out.push_str(cell.source().trim_end());
                    out.push_str("\n\n");
                }
            }
        }
    }

    if stripped > 0 {
        tracing::debug!(stripped, "Removed tagged cells");
    }
    out
}

fn assignment_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<indent>\s*)(?P<lhs>[A-Za-z_][\w.]*(?:\s*,\s*[A-Za-z_][\w.]*)*)\s*=\s*(?P<kind>!|%)(?P<rest>.*)$",
        )
        .ok()
    })
    .as_ref()
}

/// Rewrite IPython syntax in one code cell.
pub fn translate_ipython(source: &str) -> String {
    let trimmed = source.trim_start_matches(['\n', '\r']);
    if let Some(rest) = trimmed.strip_prefix("%%") {
        let (first, body) = rest.split_once('\n').unwrap_or((rest, ""));
        let (name, args) = split_magic(first);
        return format!(
            "get_ipython().run_cell_magic({}, {}, {})",
            py_str(name),
            py_str(args),
            py_str(body)
        );
    }

    let mut state = LogicalLines::default();
    let mut out = Vec::new();
    for line in source.lines() {
        if state.at_statement_start() {
            if let Some(translated) = translate_escape(line) {
                out.push(translated);
                continue;
            }
        }
        state.feed(line);
        out.push(line.to_string());
    }
    out.join("\n")
}

/// Tracks whether the next physical line starts a new Python statement:
/// no open brackets, no open triple-quoted string, no trailing backslash.
#[derive(Debug, Default)]
struct LogicalLines {
    depth: usize,
    triple: Option<char>,
    continued: bool,
}

impl LogicalLines {
    fn at_statement_start(&self) -> bool {
        self.depth == 0 && self.triple.is_none() && !self.continued
    }

    fn feed(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut comment = false;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if let Some(q) = self.triple {
                if c == '\\' {
                    i += 2;
                } else if chars[i..].starts_with(&[q, q, q]) {
                    self.triple = None;
                    i += 3;
                } else {
                    i += 1;
                }
                continue;
            }
            match c {
                '#' => {
                    comment = true;
                    break;
                }
                '\'' | '"' => {
                    if chars[i..].starts_with(&[c, c, c]) {
                        self.triple = Some(c);
                        i += 3;
                        continue;
                    }
                    // Single-quoted string ends on this line.
                    i += 1;
                    while i < chars.len() && chars[i] != c {
                        if chars[i] == '\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
        self.continued = !comment && self.triple.is_none() && line.trim_end().ends_with('\\');
    }
}

/// Rewrite a line that starts a statement, or `None` when it is plain Python.
fn translate_escape(line: &str) -> Option<String> {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    if let Some(cmd) = body.strip_prefix("!!") {
        return Some(format!("{}get_ipython().getoutput({})", indent, py_str(cmd)));
    }
    if let Some(cmd) = body.strip_prefix('!') {
        return Some(format!("{}get_ipython().system({})", indent, py_str(cmd)));
    }
    if let Some(magic) = body.strip_prefix('%') {
        if !magic.starts_with('%') && !magic.is_empty() {
            let (name, args) = split_magic(magic);
            return Some(format!(
                "{}get_ipython().run_line_magic({}, {})",
                indent,
                py_str(name),
                py_str(args)
            ));
        }
    }

    let caps = assignment_re().and_then(|re| re.captures(line))?;
    let rest = &caps["rest"];
    let call = if &caps["kind"] == "!" {
        format!("get_ipython().getoutput({})", py_str(rest))
    } else {
        let (name, args) = split_magic(rest);
        format!(
            "get_ipython().run_line_magic({}, {})",
            py_str(name),
            py_str(args)
        )
    };
    Some(format!("{}{} = {}", &caps["indent"], &caps["lhs"], call))
}

fn split_magic(s: &str) -> (&str, &str) {
    let s = s.trim_end();
    match s.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim_start()),
        None => (s, ""),
    }
}

/// Python single-quoted string literal.
pub fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
