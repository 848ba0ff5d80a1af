use clap::Subcommand;
use devlog_store::config::default_root;
use std::path::Path;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. recent_days, fetch_prs)
        key: String,
        /// Config value (true/false/number/string)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    let root = default_root();
    match cmd {
        ConfigCmd::Set { key, value } => set(&root, &key, &value),
        ConfigCmd::Get { key } => get(&root, &key),
        ConfigCmd::List => list(&root),
    }
}

// ── Command Implementations ──

/// Read config as a raw map. Returns empty map if the file is missing.
fn read_config(path: &Path) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    if !path.exists() {
        return Ok(serde_json::Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: serde_json::Value = serde_json::from_str(&content)?;
    match val {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

fn write_config(
    path: &Path,
    config: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&config)?;
    devlog_store::write_atomic(path, json.as_bytes())
}

/// Parse a string value into an appropriate JSON value (bool/number/string).
fn parse_value(s: &str) -> serde_json::Value {
    match s {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                serde_json::Value::Number(n.into())
            } else {
                serde_json::Value::String(s.to_string())
            }
        }
    }
}

/// `devlog config set <key> <value>`
fn set(root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let path = root.join("config.json");
    let mut config = read_config(&path)?;
    config.insert(key.to_string(), parse_value(value));
    write_config(&path, &config)?;
    println!("{key} = {value}");
    Ok(())
}

/// `devlog config get <key>`
fn get(root: &Path, key: &str) -> anyhow::Result<()> {
    let config = read_config(&root.join("config.json"))?;
    match config.get(key) {
        Some(val) => println!("{val}"),
        None => println!("(not set)"),
    }
    Ok(())
}

/// `devlog config list`
fn list(root: &Path) -> anyhow::Result<()> {
    let config = read_config(&root.join("config.json"))?;
    if config.is_empty() {
        println!("(no config set)");
    } else {
        for (k, v) in &config {
            println!("{k} = {v}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_types() {
        assert_eq!(parse_value("true"), serde_json::Value::Bool(true));
        assert_eq!(parse_value("14"), serde_json::json!(14));
        assert_eq!(parse_value("hello"), serde_json::json!("hello"));
    }

    #[test]
    fn set_then_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        set(tmp.path(), "recent_days", "3").unwrap();
        let config = read_config(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config.get("recent_days"), Some(&serde_json::json!(3)));
    }
}
