//! Values file loading

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::merge::deep_merge;
use crate::error::{Error, Result};

/// Read and parse one values file.
///
/// An empty or `null` document is an empty mapping. Any other non-mapping
/// top level is a parse error. `<<` merge keys are expanded here, so a key
/// brought in through an alias is an ordinary key from then on. Scalar keys
/// become strings, as helm sees them once values are converted to JSON.
pub fn load_values_file(path: &Path) -> Result<Mapping> {
    let data = fs::read(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;

    let parse_err = |source| Error::Parse { path: path.to_path_buf(), source };
    let mut value: Value = serde_yaml::from_slice(&data).map_err(parse_err)?;
    value.apply_merge().map_err(parse_err)?;
    match stringify_keys(value) {
        Value::Null => Ok(Mapping::new()),
        other => serde_yaml::from_value(other).map_err(parse_err),
    }
}

fn stringify_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, value)| (key_string(key), stringify_keys(value)))
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(stringify_keys).collect()),
        Value::Tagged(mut tagged) => {
            tagged.value = stringify_keys(std::mem::take(&mut tagged.value));
            Value::Tagged(tagged)
        }
        other => other,
    }
}

fn key_string(key: Value) -> Value {
    match key {
        Value::Null => Value::String("null".to_string()),
        Value::Bool(flag) => Value::String(flag.to_string()),
        Value::Number(number) => Value::String(number.to_string()),
        other => other,
    }
}

/// Load every file in order and fold them into one document.
///
/// Stops at the first file that cannot be read or parsed.
pub fn merge_values_files<I, P>(paths: I) -> Result<Mapping>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut merged = Mapping::new();
    for path in paths {
        let path = path.as_ref();
        let values = load_values_file(path)?;
        tracing::debug!("merging values file {} ({} top-level keys)", path.display(), values.len());
        deep_merge(&mut merged, values);
    }
    Ok(merged)
}
