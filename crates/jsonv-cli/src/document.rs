//! # Document Loading
//!
//! Reads schemas and data from disk. The format follows the file
//! extension: `.yaml`/`.yml` is parsed as YAML and converted to JSON,
//! anything else is parsed as JSON.

use std::path::Path;

use anyhow::{anyhow, Context};
use serde_json::Value;

use jsonv_schema::Schema;

/// Load a JSON or YAML document.
pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded document");
    parse_document(&content, is_yaml(path)).with_context(|| format!("parsing {}", path.display()))
}

/// Load a schema document and build the schema tree.
pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let document = load_document(path)?;
    Schema::from_json(&document).with_context(|| format!("invalid schema {}", path.display()))
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

pub fn parse_document(content: &str, yaml: bool) -> anyhow::Result<Value> {
    if yaml {
        let value: serde_yaml::Value = serde_yaml::from_str(content).context("invalid YAML")?;
        yaml_to_json_value(&value).map_err(|e| anyhow!("YAML-to-JSON conversion failed: {e}"))
    } else {
        serde_json::from_str(content).context("invalid JSON")
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped. Map keys must be strings, numbers or booleans.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                out.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(out))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_schema_document() {
        let yaml = "type: object\nproperties:\n  port:\n    type: integer\n    maximum: 65535\nrequired: [port]\n";
        let value = parse_document(yaml, true).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {"port": {"type": "integer", "maximum": 65535}},
                "required": ["port"]
            })
        );
        assert!(Schema::from_json(&value).is_ok());
    }

    #[test]
    fn test_yaml_scalars_and_keys() {
        let value = parse_document("1: one\ntrue: yes\nratio: 0.5\nnothing: ~\n", true).unwrap();
        assert_eq!(value, json!({"1": "one", "true": "yes", "ratio": 0.5, "nothing": null}));
    }

    #[test]
    fn test_json_document() {
        assert_eq!(parse_document(r#"{"a": [1, 2]}"#, false).unwrap(), json!({"a": [1, 2]}));
        assert!(parse_document("{not json", false).is_err());
    }

    #[test]
    fn test_extension_detection() {
        assert!(is_yaml(Path::new("schema.yaml")));
        assert!(is_yaml(Path::new("schema.YML")));
        assert!(!is_yaml(Path::new("schema.json")));
        assert!(!is_yaml(Path::new("schema")));
    }

    #[test]
    fn test_missing_file() {
        let err = load_document(Path::new("/nonexistent/jsonv/schema.json")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
