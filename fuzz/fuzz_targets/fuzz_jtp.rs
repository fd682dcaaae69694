#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsonsplice::jtp::{self, ThreatError, ThreatLimits, ThreatValidator, Verifier};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // one byte per limit

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Every tenth run replaces the input with a fresh well-formed document, so
/// the limits get exercised on more than the grammar's error paths.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size <= HEADER || (size >= HEADER && !seed.is_multiple_of(10)) {
        return fuzzer_mutate(data, size, max_size);
    }
    with_rng(|rng| {
        for b in &mut data[..HEADER] {
            *b = (rng.next_u32() % 12) as u8;
        }
    });
    let limit = max_size - HEADER;
    HEADER + append_value(&mut data[HEADER..], size.max(16), limit)
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };
    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(16)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=6 => Value::String(u.arbitrary()?),
            7..=11 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

fn verify(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let limit = |i: usize| usize::from(data[i]);
    let limits = ThreatLimits {
        max_depth: limit(0),
        max_array_len: limit(1),
        max_key_len: limit(2),
        max_string_len: limit(3),
        max_entry_count: limit(4),
    };
    let json = &data[HEADER..];

    let plain = jtp::validate(json);
    let limited = ThreatValidator::new(limits).verify_bytes(json);

    if plain.is_ok() {
        assert_eq!(jtp::residual_depth(json), Ok(0));
    }
    // limits only ever reject more
    if limited.is_ok() {
        assert_eq!(plain, Ok(()));
    }
    if let Err(err) = limited {
        if err.is_limit() {
            assert!(err.found() > err.max());
            assert!(err.to_string().ends_with(": jtp.MalformedJSON"));
        } else {
            assert_eq!(err.max(), None);
        }
    }

    // serde_json stops at 128 levels of nesting
    let shallow = ThreatLimits::default().with_max_depth(100);
    let too_deep = matches!(
        ThreatValidator::new(shallow).verify_bytes(json),
        Err(ThreatError::DepthExceeded { .. })
    );
    if let (false, Ok(text)) = (too_deep, std::str::from_utf8(json)) {
        let serde_ok = serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok();
        assert_eq!(plain.is_ok(), serde_ok, "{text:?}");
    }
}

fuzz_target!(|data: &[u8]| verify(data));
