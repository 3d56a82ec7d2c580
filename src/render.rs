//! Template rendering for stored context
//!
//! Placeholders take the form `{{.field}}` (the dot is optional, whitespace
//! inside the braces is ignored). `{{.}}` renders the whole field map.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::{BeaconError, Result};

/// Printed for a field the context does not have
pub const NO_VALUE: &str = "<no value>";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid regex"));

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\.)|\.?([A-Za-z_][A-Za-z0-9_]*))\s*$").expect("valid regex")
});

/// Parse raw context bytes into a field map
pub fn fields(data: &[u8]) -> Result<Map<String, Value>> {
    Ok(serde_json::from_slice(data)?)
}

/// Render `template` against `fields`
pub fn render(template: &str, fields: &Map<String, Value>) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always present");
        push_literal(&mut output, &template[last..whole.start()])?;

        let body = &caps[1];
        let field = FIELD_RE
            .captures(body)
            .ok_or_else(|| BeaconError::Template(format!("unsupported action {{{{{}}}}}", body)))?;

        match field.get(2) {
            Some(name) => match fields.get(name.as_str()) {
                Some(value) => output.push_str(&display(value)),
                None => output.push_str(NO_VALUE),
            },
            None => output.push_str(&Value::Object(fields.clone()).to_string()),
        }
        last = whole.end();
    }

    push_literal(&mut output, &template[last..])?;
    Ok(output)
}

fn push_literal(output: &mut String, text: &str) -> Result<()> {
    if text.contains("{{") {
        return Err(BeaconError::Template("unclosed action".to_string()));
    }
    output.push_str(text);
    Ok(())
}

/// Strings bare, null empty, everything else as compact JSON
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
