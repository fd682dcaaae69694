use alloc::{string::String, vec::Vec};

use rstest::rstest;

use crate::{
    delete_str, delete_with, set_in_place, set_raw_str, set_str, set_str_with, set_with,
    SetOptions, SetValue,
};

const RAW_PATH: SetOptions = SetOptions {
    optimistic: false,
    replace_in_place: false,
    raw_path: true,
};

const OPTIMISTIC: SetOptions = SetOptions {
    optimistic: true,
    replace_in_place: false,
    raw_path: false,
};

const IN_PLACE: SetOptions = SetOptions {
    optimistic: true,
    replace_in_place: true,
    raw_path: false,
};

#[rstest]
#[case::replace_nested(r#"{"a":{"b":1}}"#, "a.b", "2", r#"{"a":{"b":2}}"#)]
#[case::pad_empty_array("[]", "2", "5", "[null,null,5]")]
#[case::pad_after_elements("[1,2]", "4", "5", "[1,2,null,null,5]")]
#[case::next_index("[1,2]", "2", "3", "[1,2,3]")]
#[case::append("[1,2]", "-1", "3", "[1,2,3]")]
#[case::append_empty("[]", "-1", "3", "[3]")]
#[case::append_object(r#"{"a":[1]}"#, "a.-1.b", "true", r#"{"a":[1,{"b":true}]}"#)]
#[case::new_key(r#"{"a":1}"#, "b", "2", r#"{"a":1,"b":2}"#)]
#[case::new_key_empty_object("{ }", "a", "1", r#"{ "a":1}"#)]
#[case::scalar_intermediate(r#"{"a":1}"#, "a.b", "2", r#"{"a":{"b":2}}"#)]
#[case::scalar_root(r#""str""#, "k", "1", r#"{"k":1}"#)]
#[case::empty_document("", "a", "1", r#"{"a":1}"#)]
#[case::empty_document_index("  ", "0", "1", "  [1]")]
#[case::root_whitespace(" {\"a\":1} \n", "b", "2", " {\"a\":1,\"b\":2} \n")]
#[case::nested_arrays("{}", "a.0.b", "1", r#"{"a":[{"b":1}]}"#)]
#[case::forced_key("{}", ":1", "5", r#"{"1":5}"#)]
#[case::forced_key_nested("{}", "a.:0", "5", r#"{"a":{"0":5}}"#)]
#[case::escaped_dot_existing(r#"{"a.b":1}"#, r"a\.b", "2", r#"{"a.b":2}"#)]
#[case::escaped_dot_created("{}", r"a\.b.c", "1", r#"{"a.b":{"c":1}}"#)]
#[case::raw_object(r#"{"a":1}"#, "a", r#"{"x":[1,2]}"#, r#"{"a":{"x":[1,2]}}"#)]
#[case::keeps_formatting(
    "{\n  \"a\": 1,\n  \"b\": [1, 2]\n}",
    "b.1",
    "3",
    "{\n  \"a\": 1,\n  \"b\": [1, 3]\n}"
)]
#[case::array_of_objects(r#"{"users":[{"name":"a"}]}"#, "users.0.name", r#""b""#, r#"{"users":[{"name":"b"}]}"#)]
fn set_raw_values(
    #[case] json: &str,
    #[case] path: &str,
    #[case] raw: &str,
    #[case] expected: &str,
) {
    assert_eq!(set_raw_str(json, path, raw).unwrap(), expected);
}

#[rstest]
#[case::fan_out(r#"{"f":[{"a":1},{"a":2}]}"#, "f.#.a", "0", r#"{"f":[{"a":0},{"a":0}]}"#)]
#[case::first_query_match(
    r#"{"f":[{"n":"x","v":1},{"n":"y","v":2}]}"#,
    r#"f.#(n=="y").v"#,
    "9",
    r#"{"f":[{"n":"x","v":1},{"n":"y","v":9}]}"#
)]
#[case::every_query_match("[1,5,10]", "#(>3)#", "0", "[1,0,0]")]
#[case::glob_key(r#"{"alpha":1,"beta":2}"#, "b*", "3", r#"{"alpha":1,"beta":3}"#)]
#[case::glob_without_match(r#"{"a":1}"#, "z*", "2", r#"{"a":1}"#)]
#[case::count_is_not_settable(r#"{"a":[1,2]}"#, "a.#", "0", r#"{"a":[1,2]}"#)]
fn set_complex_paths(
    #[case] json: &str,
    #[case] path: &str,
    #[case] raw: &str,
    #[case] expected: &str,
) {
    assert_eq!(set_raw_str(json, path, raw).unwrap(), expected);
}

#[rstest]
#[case::create_path("{}", "a.b", "x", r#"{"a":{"b":"x"}}"#)]
#[case::replace(r#"{"name":"Tom"}"#, "name", "Sara", r#"{"name":"Sara"}"#)]
#[case::escapes_quotes(r#"{"a":{"b":1}}"#, "a.b", "say \"hi\"", r#"{"a":{"b":"say \"hi\""}}"#)]
#[case::escapes_non_ascii("[]", "0", "\u{e9}\n", r#"["\u00e9\n"]"#)]
fn set_strings(
    #[case] json: &str,
    #[case] path: &str,
    #[case] text: &str,
    #[case] expected: &str,
) {
    assert_eq!(set_str(json, path, text).unwrap(), expected);
}

#[test]
fn set_scalars() {
    assert_eq!(set_str(r#"{"x":0}"#, "x", 1.5).unwrap(), r#"{"x":1.5}"#);
    assert_eq!(set_str(r#"{"x":0}"#, "x", -12i64).unwrap(), r#"{"x":-12}"#);
    assert_eq!(set_str(r#"{"x":0}"#, "x", false).unwrap(), r#"{"x":false}"#);
    assert_eq!(set_str(r#"{"x":0}"#, "x", f64::INFINITY).unwrap(), r#"{"x":null}"#);
    assert_eq!(
        set_str("{}", "x", SetValue::raw(&b"[true]"[..])).unwrap(),
        r#"{"x":[true]}"#
    );
}

#[test]
fn raw_path_addresses_one_literal_key() {
    let json = r#"{"a.b":1,"a":{"b":2}}"#;
    assert_eq!(
        set_str_with(json, "a.b", 3, RAW_PATH).unwrap(),
        r#"{"a.b":3,"a":{"b":2}}"#
    );
    assert_eq!(
        set_str_with("{}", "a.b*", 1, RAW_PATH).unwrap(),
        r#"{"a.b*":1}"#
    );
    assert_eq!(
        delete_with(json.as_bytes(), "a.b", RAW_PATH).unwrap(),
        br#"{"a":{"b":2}}"#
    );
}

#[test]
fn optimistic_set_matches_full_walk() {
    let json = br#"{"a":{"b":1},"c":[1,2]}"#;
    for (path, value) in [("a.b", 5), ("c.1", 6), ("c.5", 7), ("d.e", 8)] {
        assert_eq!(
            set_with(json, path, value, OPTIMISTIC).unwrap(),
            set_with(json, path, value, SetOptions::default()).unwrap(),
            "{path}"
        );
    }
}

#[rstest]
#[case::first_of_two(r#"{"a":1,"b":2}"#, "a", r#"{"b":2}"#)]
#[case::last_of_two(r#"{"a":1,"b":2}"#, "b", r#"{"a":1}"#)]
#[case::first_of_three(r#"{"a":1,"b":2,"c":3}"#, "a", r#"{"b":2,"c":3}"#)]
#[case::middle_of_three(r#"{"a":1,"b":2,"c":3}"#, "b", r#"{"a":1,"c":3}"#)]
#[case::last_of_three(r#"{"a":1,"b":2,"c":3}"#, "c", r#"{"a":1,"b":2}"#)]
#[case::only_key(r#"{"a":1}"#, "a", "{}")]
#[case::element_first("[1,2,3]", "0", "[2,3]")]
#[case::element_middle("[1,2,3]", "1", "[1,3]")]
#[case::element_last("[1,2,3]", "2", "[1,2]")]
#[case::element_negative("[1,2,3]", "-1", "[1,2]")]
#[case::only_element("[1]", "0", "[]")]
#[case::nested(r#"{"a":{"b":1,"c":2}}"#, "a.c", r#"{"a":{"b":1}}"#)]
#[case::container_value(r#"{"a":{"x":[1,{"y":2}]},"b":0}"#, "a", r#"{"b":0}"#)]
#[case::spaced_first(r#"{ "a" : 1 , "b" : 2 }"#, "a", r#"{ "b" : 2 }"#)]
#[case::spaced_last(r#"{ "a" : 1 , "b" : 2 }"#, "b", r#"{ "a" : 1  }"#)]
#[case::pretty_first("{\n  \"a\": 1,\n  \"b\": 2\n}", "a", "{\n  \"b\": 2\n}")]
#[case::pretty_last("{\n  \"a\": 1,\n  \"b\": 2\n}", "b", "{\n  \"a\": 1\n}")]
#[case::escaped_key(r#"{"x":0,"q\"k":1}"#, "q\"k", r#"{"x":0}"#)]
#[case::missing_key(r#"{"a":1}"#, "b", r#"{"a":1}"#)]
#[case::missing_nested(r#"{"a":1}"#, "a.b", r#"{"a":1}"#)]
#[case::missing_element("[]", "-1", "[]")]
fn deletes(#[case] json: &str, #[case] path: &str, #[case] expected: &str) {
    assert_eq!(delete_str(json, path).unwrap(), expected);
}

#[test]
fn in_place_overwrites_existing_storage() {
    let mut json = br#"{"count":100,"ok":true}"#.to_vec();
    let ptr = json.as_ptr();
    set_in_place(&mut json, "count", 7, IN_PLACE).unwrap();
    assert_eq!(json, br#"{"count":7,"ok":true}"#);
    assert_eq!(json.as_ptr(), ptr);
}

#[test]
fn in_place_grows_and_escapes() {
    let mut json = br#"{"name":"","n":1}"#.to_vec();
    set_in_place(&mut json, "name", "a\"b", IN_PLACE).unwrap();
    assert_eq!(json, br#"{"name":"a\"b","n":1}"#);
}

#[test]
fn in_place_falls_back_to_rebuild() {
    let mut json = br#"{"a":1}"#.to_vec();
    set_in_place(&mut json, "b.c", 2, IN_PLACE).unwrap();
    assert_eq!(json, br#"{"a":1,"b":{"c":2}}"#);

    set_in_place(&mut json, "a", 3, SetOptions::default()).unwrap();
    assert_eq!(json, br#"{"a":3,"b":{"c":2}}"#);

    set_in_place(&mut json, "z*", 4, IN_PLACE).unwrap();
    assert_eq!(json, br#"{"a":3,"b":{"c":2}}"#);
}

#[test]
fn edits_compose() {
    let mut json: Vec<u8> = br#"{"name":{"first":"Tom"}}"#.to_vec();
    json = set_with(&json, "name.last", "Anderson", SetOptions::default()).unwrap();
    json = set_with(&json, "friends.-1", "Sara", SetOptions::default()).unwrap();
    json = set_with(&json, "friends.-1", "Alex", SetOptions::default()).unwrap();
    json = delete_with(&json, "friends.0", SetOptions::default()).unwrap();
    json = delete_with(&json, "name.first", SetOptions::default()).unwrap();
    let text = String::from_utf8(json).unwrap();
    assert_eq!(text, r#"{"name":{"last":"Anderson"},"friends":["Alex"]}"#);
}
