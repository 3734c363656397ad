//! Fuzz target for value parsing and column inference.
//!
//! This fuzzer tests that the inference engine:
//! 1. Never panics on any input values
//! 2. Correctly handles malformed dates and numbers
//! 3. Normalizes whatever type it infers without crashing

#![no_main]

use libfuzzer_sys::fuzz_target;
use sifter::schema::TypeKind;
use sifter::{ColumnInferrer, Normalizer, ValueParser};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let parser = ValueParser::new();
        let _ = parser.parse(content, &TypeKind::CANDIDATES);

        // Treat each line as a cell of one column
        let values: Vec<Option<&str>> = content.lines().map(Some).collect();
        let profile = ColumnInferrer::new().infer("fuzz", 0, &values);
        let normalized = Normalizer::default().normalize_column(&profile, &values);
        assert!(normalized.failures <= values.len());
        assert!((0.0..=1.0).contains(&profile.confidence));
    }
});
