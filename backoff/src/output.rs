use anyhow::Result;
use serde_json::Value as JsonValue;
use std::io::{self, Write};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Yaml,
    Json,
    Raw,
}

pub fn emit_data(fmt: &OutputFormat, data: &JsonValue) -> Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(render(fmt, data)?.as_bytes())?;
    out.flush()?;
    Ok(())
}

pub fn render(fmt: &OutputFormat, data: &JsonValue) -> Result<String> {
    let s = match fmt {
        OutputFormat::Yaml => format!("{}\n", serde_yaml::to_string(data)?.trim_end()),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(data)?),
        // one line per item, strings unquoted
        OutputFormat::Raw => match data {
            JsonValue::Array(items) => items.iter().map(|v| raw_line(v) + "\n").collect(),
            other => raw_line(other) + "\n",
        },
    };
    Ok(s)
}

fn raw_line(v: &JsonValue) -> String {
    match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    }
}

pub fn error_value(err: &anyhow::Error) -> JsonValue {
    let mut map = serde_json::Map::new();
    map.insert("error".into(), JsonValue::String(err.to_string()));
    let causes: Vec<JsonValue> = err
        .chain()
        .skip(1)
        .map(|c| JsonValue::String(c.to_string()))
        .collect();
    if !causes.is_empty() {
        map.insert("causes".into(), JsonValue::Array(causes));
    }
    JsonValue::Object(map)
}

pub fn emit_error(err: &anyhow::Error) -> Result<()> {
    let s = serde_yaml::to_string(&error_value(err))?;
    let _ = writeln!(io::stderr(), "{}", s.trim_end());
    Ok(())
}
