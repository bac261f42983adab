use serde_json::Value;

use crate::types::Attributes;

/// Folds a member's attributes into the representative's.
///
/// Keys missing on the representative are copied over. On conflict the
/// representative keeps its value, except that two lists are unioned
/// (deduplicated, representative items first) and two maps are deep-merged
/// under the same rules.
pub fn merge_attributes(representative: &mut Attributes, member: &Attributes) {
    for (key, incoming) in member {
        match representative.get_mut(key) {
            None => {
                representative.insert(key.clone(), incoming.clone());
            }
            Some(existing) => merge_value(existing, incoming),
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Array(ours), Value::Array(theirs)) => {
            for item in theirs {
                if !ours.contains(item) {
                    ours.push(item.clone());
                }
            }
        }
        (Value::Object(ours), Value::Object(theirs)) => {
            for (key, value) in theirs {
                match ours.get_mut(key) {
                    None => {
                        ours.insert(key.clone(), value.clone());
                    }
                    Some(nested) => merge_value(nested, value),
                }
            }
        }
        _ => {}
    }
}
