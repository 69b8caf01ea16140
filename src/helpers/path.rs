//! Path access on JSON values.
//!
//! Paths use dots and brackets: `user.roles[0].name`, `user.roles.0.name` and
//! `user["roles"][0]` all address the same slot. Purely numeric segments index
//! arrays; `set` creates arrays for them and objects for everything else.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    key: String,
    index: Option<usize>,
}

impl Segment {
    fn new(key: &str) -> Self {
        let key = key.trim_matches(|c| c == '"' || c == '\'');
        let index = if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            key.parse().ok()
        } else {
            None
        };
        Self {
            key: key.to_string(),
            index,
        }
    }

    fn empty_container(&self) -> Value {
        match self.index {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Object(Map::new()),
        }
    }
}

fn parse(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for c in path.chars() {
        match c {
            '.' if !in_brackets => flush(&mut current, &mut segments),
            '[' if !in_brackets => {
                flush(&mut current, &mut segments);
                in_brackets = true;
            }
            ']' if in_brackets => {
                flush(&mut current, &mut segments);
                in_brackets = false;
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut segments);
    segments
}

fn flush(current: &mut String, segments: &mut Vec<Segment>) {
    if !current.is_empty() {
        segments.push(Segment::new(current));
        current.clear();
    }
}

fn child<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(&segment.key),
        Value::Array(items) => segment.index.and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(&segment.key),
        Value::Array(items) => segment.index.and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Slot for `segment` inside `container`, creating containers as needed
fn slot<'a>(container: &'a mut Value, segment: &Segment) -> &'a mut Value {
    let fits = matches!(
        (&*container, segment.index),
        (Value::Object(_), _) | (Value::Array(_), Some(_))
    );
    if !fits {
        *container = segment.empty_container();
    }
    match container {
        Value::Array(items) => {
            let index = segment.index.unwrap_or(items.len());
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(segment.key.clone()).or_insert(Value::Null),
        other => other,
    }
}

/// Value at `path`, if every segment exists
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    parse(path)
        .iter()
        .try_fold(value, |current, segment| child(current, segment))
}

/// Set `new_value` at `path`, creating intermediate containers
///
/// Scalars found along the way are replaced. An empty path replaces `target`.
pub fn set(target: &mut Value, path: &str, new_value: Value) {
    let segments = parse(path);
    let mut current = target;
    for (i, segment) in segments.iter().enumerate() {
        current = slot(current, segment);
        if let Some(next) = segments.get(i + 1) {
            let is_container = current.is_object() || current.is_array();
            if !is_container {
                *current = next.empty_container();
            }
        }
    }
    *current = new_value;
}

/// Remove the value at `path`; returns whether anything was removed
///
/// Array slots are nulled rather than shifted so later indexes stay stable.
pub fn unset(target: &mut Value, path: &str) -> bool {
    let mut segments = parse(path);
    let Some(last) = segments.pop() else {
        return false;
    };

    let mut parent = target;
    for segment in &segments {
        match child_mut(parent, segment) {
            Some(next) => parent = next,
            None => return false,
        }
    }

    match parent {
        Value::Object(map) => map.remove(&last.key).is_some(),
        Value::Array(items) => match last.index.and_then(|i| items.get_mut(i)) {
            Some(slot) => {
                *slot = Value::Null;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Deep-merge `patch` into `target`
///
/// Objects are merged key by key; any other patch value replaces the target.
pub fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
