#![no_main]

use arbitrary::Arbitrary;
use jsonsplice::{SetOptions, jtp};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    json: String,
    path: String,
    value: Option<String>,
    optimistic: bool,
    raw_path: bool,
}

fn splice(input: Input) {
    let opts = SetOptions {
        optimistic: input.optimistic,
        replace_in_place: false,
        raw_path: input.raw_path,
    };
    let json = input.json.as_bytes();
    // wildcard and query paths are left to the locator's own rules
    let simple = jsonsplice::segment(&input.path, input.raw_path).is_ok();
    let checked = simple && jtp::validate(json).is_ok();

    let Some(value) = input.value else {
        if let Ok(out) = jsonsplice::delete_with(json, &input.path, opts) {
            if checked {
                assert!(jtp::validate(&out).is_ok(), "{out:?}");
            }
        }
        return;
    };

    let result = jsonsplice::set_with(json, &input.path, value.as_str(), opts);

    let mut buf = json.to_vec();
    let in_place = jsonsplice::set_in_place(
        &mut buf,
        &input.path,
        value.as_str(),
        SetOptions {
            replace_in_place: true,
            ..opts
        },
    );
    match (&result, in_place) {
        (Ok(out), Ok(())) => assert_eq!(out, &buf),
        (Err(a), Err(b)) => assert_eq!(a, &b),
        (a, b) => panic!("set and set_in_place disagree: {a:?} vs {b:?}"),
    }

    if let (true, Ok(out)) = (checked, result) {
        assert!(jtp::validate(&out).is_ok(), "{out:?}");
    }
}

fuzz_target!(|input: Input| splice(input));
