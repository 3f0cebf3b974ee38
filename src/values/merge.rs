//! Deep merge with override

use serde_yaml::{Mapping, Value};

/// Fold `incoming` into `base`.
///
/// Nested mappings present on both sides merge key by key. Anything else
/// (scalars, sequences, a mapping meeting a non-mapping) is replaced by the
/// incoming value. Existing keys keep their position; new keys are appended.
pub fn deep_merge(base: &mut Mapping, incoming: Mapping) {
    for (key, value) in incoming {
        if let Value::Mapping(incoming_map) = value {
            if let Some(Value::Mapping(existing)) = base.get_mut(&key) {
                deep_merge(existing, incoming_map);
                continue;
            }
            base.insert(key, Value::Mapping(incoming_map));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn doc(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).expect("test yaml")
    }

    fn merged(docs: &[&str]) -> Mapping {
        let mut acc = Mapping::new();
        for d in docs {
            deep_merge(&mut acc, doc(d));
        }
        acc
    }

    #[test]
    fn test_later_scalar_wins() {
        let a = "image: {tag: '1.0'}\nreplicas: 1\n";
        let b = "replicas: 3\n";
        assert_eq!(merged(&[a, b]), doc("image: {tag: '1.0'}\nreplicas: 3\n"));
        assert_eq!(merged(&[b, a]), doc("replicas: 1\nimage: {tag: '1.0'}\n"));
    }

    #[test]
    fn test_nested_mappings_union_keys() {
        let result = merged(&["a: 1\nb: {c: 2}\n", "b: {c: 3, d: 4}\n"]);
        assert_eq!(result, doc("a: 1\nb: {c: 3, d: 4}\n"));
    }

    #[test]
    fn test_deeply_nested_merge() {
        let result = merged(&[
            "x: {y: {z: 1, keep: true}, other: [1]}\n",
            "x: {y: {z: 2, new: n}}\n",
        ]);
        assert_eq!(result, doc("x: {y: {z: 2, keep: true, new: n}, other: [1]}\n"));
    }

    #[test]
    fn test_sequences_are_replaced_not_concatenated() {
        let result = merged(&["hosts: [a, b, c]\n", "hosts: [d]\n"]);
        assert_eq!(result, doc("hosts: [d]\n"));
    }

    #[test]
    fn test_type_changes_replace_whole_value() {
        assert_eq!(merged(&["a: {b: 1}\n", "a: flat\n"]), doc("a: flat\n"));
        assert_eq!(merged(&["a: flat\n", "a: {b: 1}\n"]), doc("a: {b: 1}\n"));
        assert_eq!(merged(&["a: {b: 1}\n", "a: [1, 2]\n"]), doc("a: [1, 2]\n"));
    }

    #[test]
    fn test_null_and_empty_values_still_override() {
        assert_eq!(merged(&["a: 1\n", "a: null\n"]), doc("a: null\n"));
        assert_eq!(merged(&["a: text\n", "a: ''\n"]), doc("a: ''\n"));
    }

    #[test]
    fn test_merging_a_document_with_itself_is_identity() {
        let a = "a: 1\nb: {c: [1, 2], d: {e: f}}\nlist: [x]\n";
        assert_eq!(merged(&[a, a]), doc(a));
        assert_eq!(merged(&[a]), doc(a));
    }

    #[test]
    fn test_new_keys_are_appended_in_order() {
        let result = merged(&["b: 1\na: 1\n", "c: 1\nb: 2\n"]);
        let keys: Vec<_> = result.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
