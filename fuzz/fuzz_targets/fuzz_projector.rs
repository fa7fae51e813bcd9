#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use json_projection::{Error, ParserOptions, Projector, Schema, StreamingParser};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag byte + 4-byte chunk seed

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        prefix += append_whitespace(&mut data[prefix..], max_size - prefix);
        prefix += append_document(&mut data[prefix..], size.max(16), max_size - prefix);
        prefix += append_whitespace(&mut data[prefix..], max_size - prefix);
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends up to eight JSON whitespace characters without exceeding `limit`.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        let n = rng.random_range(0..=limit.min(8));
        for slot in &mut buf[..n] {
            *slot = WS_TABLE[rng.random_range(0..WS_TABLE.len())][0];
        }
        n
    })
}

/// Appends a serialized object or array, truncated to `limit` bytes.
fn append_document(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(ArbitraryDocument(value)) =
            ArbitraryDocument::arbitrary(&mut arbitrary::Unstructured::new(&bytes))
        {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value).expect("failed to serialize arbitrary value");
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
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::Number(u.arbitrary::<i64>()?.into()),
            4..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
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

/// A value whose top level is an object or an array.
#[derive(Debug)]
struct ArbitraryDocument(Value);

impl<'a> Arbitrary<'a> for ArbitraryDocument {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let value = if u.arbitrary()? {
            let elems: Vec<ArbitraryValue> = u.arbitrary()?;
            Value::Array(elems.into_iter().map(|v| v.0).collect())
        } else {
            let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
            Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
        };
        Ok(ArbitraryDocument(value))
    }
}

/// Keeps every key of `value` whose first byte has the low bit set.
fn schema_for(value: &Value) -> Schema {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| key.bytes().next().is_some_and(|b| b & 1 == 1))
            .map(|(key, sub)| (key.clone(), schema_for(sub)))
            .collect(),
        Value::Array(items) => items.first().map_or(Schema::All, schema_for),
        _ => Schema::All,
    }
}

fn projector(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let chunk_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as usize;
    let data = &data[HEADER..];
    let options = ParserOptions::default().with_chunk_size(chunk_seed % 64);

    // Every prefix of the event stream is well-formed: pulling never panics
    // and stops at the first error or at `EndDocument`.
    let mut pulled = 0usize;
    for event in StreamingParser::with_options(data, options) {
        pulled += 1;
        if event.is_err() {
            break;
        }
    }
    assert!(pulled <= 2 * data.len() + 2);

    let full = json_projection::project(data, &Schema::All);
    let schema = match &full {
        Ok(value) if flags & 1 == 1 => schema_for(value),
        _ => Schema::fields(),
    };
    let filtered = Projector::with_options(data, options).project(&schema);

    match (&full, &filtered) {
        // Filtering only skips; it cannot turn a valid document invalid.
        (Ok(_), Err(err)) => panic!("full projection succeeded, filtered failed: {err}"),
        (Err(Error::Io(err)), _) => panic!("slice reader failed: {err}"),
        _ => {}
    }
}

fuzz_target!(|data: &[u8]| projector(data));
