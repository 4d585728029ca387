use primescape_core::{NumericRecord, Property, Rounding};
use primescape_decomp::{decompose_all, DecomposeOpts};
use primescape_palette::{bucket_by_property, BucketOpts, Palette};
use proptest::prelude::*;

fn synthetic(value: u64, division_family: u64) -> NumericRecord {
    NumericRecord {
        value,
        is_prime: false,
        prime_factors: Vec::new(),
        ideal_factor: 0.0,
        mean_deviation: 0.0,
        antislope: 0.0,
        division_family,
    }
}

proptest! {
    #[test]
    fn every_record_lands_in_exactly_one_bucket(
        families in prop::collection::vec(1u64..600, 1..400),
        capacity in 1usize..300,
    ) {
        let records: Vec<NumericRecord> = families
            .iter()
            .enumerate()
            .map(|(index, &family)| synthetic(index as u64 + 1, family))
            .collect();
        let opts = BucketOpts {
            property: Property::DivisionFamily,
            rounding: Rounding::None,
            include_primes: false,
        };
        let buckets = bucket_by_property(&records, &opts).unwrap();
        let assignment = buckets.aggregate(capacity).unwrap();

        prop_assert!(assignment.bucket_count() <= capacity);
        prop_assert_eq!(assignment.record_count(), records.len());
        let key_total: usize = assignment.buckets().iter().map(|bucket| bucket.keys.len()).sum();
        prop_assert_eq!(key_total, buckets.len());

        for record in &records {
            let index = assignment.bucket_of(record.value).unwrap();
            let members = assignment.values(index).unwrap();
            prop_assert!(members.contains(&record.value));
        }

        for pair in assignment.buckets().windows(2) {
            prop_assert!(!pair[0].keys.is_empty());
            let last = pair[0].keys.last().copied().unwrap();
            let first = pair[1].keys.first().copied().unwrap();
            prop_assert!(last < first);
        }

        let base = assignment.base() as usize;
        let sizes: Vec<usize> = assignment.buckets().iter().map(|bucket| bucket.keys.len()).collect();
        if capacity > 1 && sizes.len() > 1 {
            let mut expected = 1usize;
            for size in &sizes[..sizes.len() - 1] {
                prop_assert_eq!(*size, expected);
                expected = expected.saturating_mul(base);
            }
        }
    }

    #[test]
    fn decomposed_antislopes_fit_categorical_palettes(lower in 2u64..5000, span in 1u64..400) {
        let values: Vec<u64> = (lower..lower + span).collect();
        let records = decompose_all(&values, &DecomposeOpts::with_workers(3)).unwrap();
        let opts = BucketOpts {
            property: Property::Antislope,
            rounding: Rounding::Round,
            include_primes: false,
        };
        let buckets = bucket_by_property(&records, &opts).unwrap();
        let composites = records.iter().filter(|record| !record.is_prime).count();
        prop_assert_eq!(buckets.record_count(), composites);

        match buckets.aggregate(Palette::Category10.capacity()) {
            Ok(assignment) => {
                prop_assert!(assignment.bucket_count() <= 10);
                prop_assert_eq!(assignment.record_count(), composites);
            }
            Err(err) => {
                prop_assert!(err.is_recoverable());
                prop_assert_eq!(composites, 0);
            }
        }
    }
}
