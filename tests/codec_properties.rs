//! Propriedades do codec de identificadores e do softmax.

use cui2vec::{decode_identifier, encode_identifier, softmax, ScoredEntry};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decode_inverts_encode(n in any::<u32>()) {
        prop_assert_eq!(decode_identifier(&encode_identifier(n)), Ok(n));
    }

    #[test]
    fn encode_inverts_decode(id in "C[0-9]{7}") {
        let n = decode_identifier(&id).unwrap();
        prop_assert_eq!(encode_identifier(n), id);
    }

    #[test]
    fn wrong_prefix_is_rejected(id in "[A-BD-Za-z][0-9]{7}") {
        prop_assert!(decode_identifier(&id).is_err());
    }

    #[test]
    fn softmax_sums_to_one(values in prop::collection::vec(-50.0f64..50.0, 1..200)) {
        let entries: Vec<ScoredEntry> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ScoredEntry::new(format!("C{i:07}"), *v))
            .collect();

        let out = softmax(&entries);
        let total: f64 = out.iter().map(|e| e.value).sum();

        prop_assert_eq!(out.len(), entries.len());
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(out.iter().all(|e| e.value >= 0.0));
    }
}
