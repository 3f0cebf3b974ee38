//! Tree walk that resolves operator expressions in place

use std::cmp::Ordering;

use serde_yaml::{Mapping, Value};

use super::expr::{self, Alternatives, Expr, Operand};
use super::EvalError;

#[derive(Debug, Clone, PartialEq)]
enum Seg {
    Key(Value),
    Index(usize),
}

type DocPath = Vec<Seg>;

/// Children still to visit below a node.
enum NodeKind {
    Keys(Vec<Value>),
    Items(usize),
    Leaf,
}

pub(super) struct Engine {
    root: Value,
    in_progress: Vec<DocPath>,
    pruned: Vec<DocPath>,
}

impl Engine {
    pub(super) fn new(document: Mapping) -> Self {
        Self { root: Value::Mapping(document), in_progress: Vec::new(), pruned: Vec::new() }
    }

    pub(super) fn run(mut self) -> Result<Mapping, EvalError> {
        self.eval_tree(&mut Vec::new())?;
        self.apply_prunes();
        match self.root {
            Value::Mapping(map) => Ok(map),
            _ => Ok(Mapping::new()),
        }
    }

    /// Resolve the node at `path` and everything below it.
    fn eval_tree(&mut self, path: &mut DocPath) -> Result<(), EvalError> {
        self.settle(path)?;

        match self.kind(path) {
            NodeKind::Keys(keys) => {
                for key in keys {
                    path.push(Seg::Key(key));
                    self.eval_tree(path)?;
                    path.pop();
                }
            }
            NodeKind::Items(len) => {
                for index in 0..len {
                    path.push(Seg::Index(index));
                    self.eval_tree(path)?;
                    path.pop();
                }
            }
            NodeKind::Leaf => {}
        }
        Ok(())
    }

    /// Replace the node at `path` with its value if it is an expression.
    fn settle(&mut self, path: &DocPath) -> Result<(), EvalError> {
        let Some(Value::String(text)) = self.node(path) else {
            return Ok(());
        };
        let text = text.clone();
        let Some(parsed) = expr::parse(&text) else {
            return Ok(());
        };
        let expr = parsed.map_err(|message| EvalError::Syntax { path: render(path), message })?;

        if self.in_progress.contains(path) {
            return Err(EvalError::Cycle { path: render(path), reference: text });
        }

        self.in_progress.push(path.clone());
        let value = self.apply(path, expr)?;
        self.in_progress.pop();

        if let Some(slot) = self.node_mut(path) {
            *slot = value;
        }
        Ok(())
    }

    fn apply(&mut self, path: &DocPath, expr: Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Grab(args) => {
                if let [single] = args.as_slice() {
                    return self.resolve_arg(path, single);
                }
                let mut values = Vec::new();
                for arg in &args {
                    match self.resolve_arg(path, arg)? {
                        Value::Sequence(items) => values.extend(items),
                        other => values.push(other),
                    }
                }
                Ok(Value::Sequence(values))
            }
            Expr::Concat(args) => {
                let mut out = String::new();
                for arg in &args {
                    let value = self.resolve_arg(path, arg)?;
                    let Some(text) = scalar_text(&value) else {
                        return Err(EvalError::NotScalar {
                            path: render(path),
                            reference: describe(arg),
                        });
                    };
                    out.push_str(&text);
                }
                Ok(Value::String(out))
            }
            Expr::Param(message) => Err(EvalError::Param { path: render(path), message }),
            Expr::Prune => {
                self.pruned.push(path.clone());
                Ok(Value::Null)
            }
        }
    }

    /// First operand that resolves wins.
    fn resolve_arg(&mut self, at: &DocPath, arg: &Alternatives) -> Result<Value, EvalError> {
        for operand in arg {
            match operand {
                Operand::Literal(value) => return Ok(value.clone()),
                Operand::Reference(segments) => {
                    if let Some(value) = self.resolve_reference(segments)? {
                        return Ok(value);
                    }
                }
            }
        }
        Err(EvalError::Unresolved { path: render(at), reference: describe(arg) })
    }

    /// Look up a dotted reference, evaluating whatever lies on the way.
    fn resolve_reference(&mut self, segments: &[String]) -> Result<Option<Value>, EvalError> {
        let mut path = DocPath::new();
        for segment in segments {
            self.settle(&path)?;
            let Some(seg) = self.child(&path, segment) else {
                return Ok(None);
            };
            path.push(seg);
        }
        self.eval_tree(&mut path)?;
        Ok(self.node(&path).cloned())
    }

    fn kind(&self, path: &DocPath) -> NodeKind {
        match self.node(path) {
            Some(Value::Mapping(map)) => {
                NodeKind::Keys(map.iter().map(|(key, _)| key.clone()).collect())
            }
            Some(Value::Sequence(items)) => NodeKind::Items(items.len()),
            _ => NodeKind::Leaf,
        }
    }

    fn child(&self, path: &DocPath, segment: &str) -> Option<Seg> {
        match self.node(path)? {
            Value::Mapping(map) => map
                .iter()
                .map(|(k, _)| k)
                .find(|k| key_label(k).as_deref() == Some(segment))
                .map(|k| Seg::Key(k.clone())),
            Value::Sequence(items) => {
                segment.parse::<usize>().ok().filter(|i| *i < items.len()).map(Seg::Index)
            }
            _ => None,
        }
    }

    fn node(&self, path: &[Seg]) -> Option<&Value> {
        let mut current = &self.root;
        for seg in path {
            current = match seg {
                Seg::Key(key) => current.as_mapping()?.get(key)?,
                Seg::Index(index) => current.as_sequence()?.get(*index)?,
            };
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &[Seg]) -> Option<&mut Value> {
        let mut current = &mut self.root;
        for seg in path {
            current = match seg {
                Seg::Key(key) => current.as_mapping_mut()?.get_mut(key)?,
                Seg::Index(index) => current.as_sequence_mut()?.get_mut(*index)?,
            };
        }
        Some(current)
    }

    /// Remove pruned nodes. Deeper paths and higher sequence indices go
    /// first so earlier removals never shift a later target.
    fn apply_prunes(&mut self) {
        let mut pruned = std::mem::take(&mut self.pruned);
        pruned.sort_by(|a, b| compare_paths(b, a));

        for path in pruned {
            let Some((last, parent)) = path.split_last() else {
                continue;
            };
            match (last, self.node_mut(parent)) {
                (Seg::Key(key), Some(Value::Mapping(map))) => {
                    map.remove(key);
                }
                (Seg::Index(index), Some(Value::Sequence(items))) if *index < items.len() => {
                    items.remove(*index);
                }
                _ => {}
            }
        }
    }
}

fn compare_paths(a: &[Seg], b: &[Seg]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Seg::Index(i), Seg::Index(j)) => i.cmp(j),
            (Seg::Key(k), Seg::Key(l)) => key_label(k).cmp(&key_label(l)),
            (Seg::Key(_), Seg::Index(_)) => Ordering::Less,
            (Seg::Index(_), Seg::Key(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn key_label(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `$.a.b.0` style rendering for diagnostics.
fn render(path: &[Seg]) -> String {
    let mut out = String::from("$");
    for seg in path {
        out.push('.');
        match seg {
            Seg::Key(key) => out.push_str(key_label(key).as_deref().unwrap_or("?")),
            Seg::Index(index) => out.push_str(&index.to_string()),
        }
    }
    out
}

fn describe(arg: &Alternatives) -> String {
    arg.iter()
        .map(|operand| match operand {
            Operand::Reference(segments) => segments.join("."),
            Operand::Literal(value) => match value {
                Value::String(s) => format!("{s:?}"),
                other => scalar_text(other).unwrap_or_else(|| "nil".to_string()),
            },
        })
        .collect::<Vec<_>>()
        .join(" || ")
}
