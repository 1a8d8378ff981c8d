use std::sync::OnceLock;

use regex::Regex;

/// One `{{name:arg1:arg2:...}}` call found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCall {
    /// Function name, e.g. `csv_cell`.
    pub name: String,
    /// Colon-split, trimmed arguments.
    pub args: Vec<String>,
    /// Byte range of the full `{{...}}` token in the source text.
    pub span: (usize, usize),
}

impl TemplateCall {
    /// The call as written, for error messages.
    pub fn raw(&self) -> String {
        format!("{{{{{}:{}}}}}", self.name, self.args.join(":"))
    }
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*):([^{}]*)\}\}").expect("valid call pattern")
    })
}

/// Find every function call token in `text`, in source order.
///
/// Tokens without a colon are not calls and are skipped; argument text is
/// split on `:` and trimmed. Dispatch decides whether a name is known.
pub fn scan_calls(text: &str) -> Vec<TemplateCall> {
    call_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            let args = caps
                .get(2)?
                .as_str()
                .split(':')
                .map(|arg| arg.trim().to_string())
                .collect();
            Some(TemplateCall {
                name,
                args,
                span: (full.start(), full.end()),
            })
        })
        .collect()
}
