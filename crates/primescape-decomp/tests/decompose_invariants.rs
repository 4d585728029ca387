use primescape_decomp::{decompose, is_prime};
use proptest::prelude::*;

proptest! {
    #[test]
    fn factors_multiply_back_to_the_value(value in 2u64..5_000_000) {
        let record = decompose(value).unwrap();
        prop_assert!(!record.prime_factors.is_empty());
        prop_assert_eq!(record.prime_factors.iter().product::<u64>(), value);
        prop_assert!(record.prime_factors.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(record.prime_factors.iter().all(|&factor| is_prime(factor)));
    }

    #[test]
    fn division_family_times_largest_factor_is_the_value(value in 2u64..5_000_000) {
        let record = decompose(value).unwrap();
        let largest = *record.prime_factors.last().unwrap();
        if record.is_prime {
            prop_assert_eq!(record.division_family, value);
        } else {
            prop_assert_eq!(record.division_family * largest, value);
        }
    }

    #[test]
    fn primality_matches_single_self_factor(value in 1u64..5_000_000) {
        let record = decompose(value).unwrap();
        let single_self = record.prime_factors.len() == 1 && record.prime_factors[0] == value;
        prop_assert_eq!(record.is_prime, single_self);
        prop_assert_eq!(record.is_prime, is_prime(value));
    }

    #[test]
    fn statistics_are_non_negative(value in 1u64..5_000_000) {
        let record = decompose(value).unwrap();
        prop_assert!(record.mean_deviation >= 0.0);
        prop_assert!(record.antislope >= 0.0);
        prop_assert!(record.ideal_factor >= 0.0);
    }
}
