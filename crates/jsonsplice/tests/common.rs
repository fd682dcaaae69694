#![allow(missing_docs, dead_code)]
#![allow(clippy::needless_raw_string_hashes)]

pub const PROFILE: &str = r#"{"name":{"first":"Tom","last":"Anderson"},"age":37,"children":["Sara","Alex","Jack"],"friends":[{"first":"James","last":"Murphy"},{"first":"Roger","last":"Craig"}]}"#;

pub const SERVICE: &str = r#"{
  "service": "api",
  "limits": {
    "rps": 10
  },
  "tags": [
    "a",
    "b"
  ]
}"#;

// depth 3, widest array 3, longest key 8, longest string 5, most entries 3
pub const ORDER: &str = r#"{
  "order": "A-1",
  "customer": {"name": "Zoë", "tags": ["vip", "early"]},
  "lines": [
    {"sku": "x1", "qty": 2},
    {"sku": "y22", "qty": 1},
    {"sku": "z333", "qty": 5}
  ]
}"#;
