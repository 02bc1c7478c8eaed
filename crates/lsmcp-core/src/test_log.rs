//! Structured test logging utilities.
//!
//! Emits JSONL entries to target/test-logs for machine-parsable test traces.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_DIR_NAME: &str = "test-logs";

fn log_file_path() -> PathBuf {
    let target = std::env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("../../target"));
    target
        .join(LOG_DIR_NAME)
        .join(format!("lsmcp-core-tests-{}.jsonl", std::process::id()))
}

fn append_line(line: &str) -> std::io::Result<()> {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", line)
}

/// Emit a structured JSONL log entry for tests.
pub fn log_event(level: &str, msg: &str, file: &str, line: u32, fields: &[(&str, Value)]) {
    let mut map = Map::new();
    map.insert(
        "ts".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    map.insert("level".into(), Value::String(level.to_string()));
    map.insert("msg".into(), Value::String(msg.to_string()));
    map.insert("file".into(), Value::String(file.to_string()));
    map.insert("line".into(), Value::from(line));
    map.insert(
        "test".into(),
        Value::String(std::thread::current().name().unwrap_or("unnamed").to_string()),
    );

    for (key, value) in fields {
        if map.contains_key(*key) {
            map.insert(format!("extra_{}", key), value.clone());
        } else {
            map.insert((*key).to_string(), value.clone());
        }
    }

    let result = serde_json::to_string(&Value::Object(map))
        .map_err(std::io::Error::other)
        .and_then(|line| append_line(&line));
    if let Err(err) = result {
        eprintln!("test_log: failed to write entry: {}", err);
    }
}

#[macro_export]
macro_rules! test_log {
    ($level:ident, $msg:expr $(, $key:ident = $val:expr )* $(,)?) => {{
        let fields = vec![
            $(
                (stringify!($key), serde_json::json!($val)),
            )*
        ];
        $crate::test_log::log_event(stringify!($level), &$msg.to_string(), file!(), line!(), &fields);
    }};
}
