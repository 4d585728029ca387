use primescape_core::ScapeError;
use primescape_decomp::{
    continuous_range, family_members, filter_by_families, FamilyScheme, IdentityFactorSpec,
    IdentityMinimum, IdentityMode,
};

#[test]
fn continuous_range_drops_primes_unless_included() {
    assert_eq!(continuous_range(2, 10, false).unwrap(), vec![4, 6, 8, 9, 10]);
    assert_eq!(continuous_range(1, 5, true).unwrap(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn continuous_range_rejects_bad_bounds() {
    assert!(matches!(
        continuous_range(0, 5, true),
        Err(ScapeError::InvalidInput(_))
    ));
    assert!(matches!(
        continuous_range(9, 5, true),
        Err(ScapeError::InvalidInput(_))
    ));
}

#[test]
fn family_filter_counts_each_family() {
    let values: Vec<u64> = (2..=30).collect();
    let report = filter_by_families(&values, &[2, 6]);
    // The prime 2 is its own family and therefore counted.
    assert_eq!(report.values, vec![2, 4, 6, 10, 14, 18, 22, 26, 30]);
    assert_eq!(report.counts[&2], 7);
    assert_eq!(report.counts[&6], 2);
}

#[test]
fn family_filter_reports_empty_match() {
    let report = filter_by_families(&[4, 6, 8], &[1000]);
    assert!(report.is_empty());
    assert_eq!(report.counts[&1000], 0);
}

#[test]
fn count_mode_starts_above_the_family() {
    let scheme = FamilyScheme {
        families: vec![vec![3, 2]],
        identity_factor: IdentityFactorSpec {
            count: 3,
            ..IdentityFactorSpec::default()
        },
    };
    // identity primes 5, 7, 11, 13
    assert_eq!(family_members(&scheme).unwrap(), vec![30, 42, 66, 78]);
}

#[test]
fn count_mode_from_origin_and_explicit_value() {
    let origin = FamilyScheme {
        families: vec![vec![5]],
        identity_factor: IdentityFactorSpec {
            minimum: IdentityMinimum::Origin,
            count: 2,
            ..IdentityFactorSpec::default()
        },
    };
    assert_eq!(family_members(&origin).unwrap(), vec![10, 15, 25]);

    let explicit = FamilyScheme {
        families: vec![vec![2]],
        identity_factor: IdentityFactorSpec {
            minimum: IdentityMinimum::Value(20),
            count: 1,
            ..IdentityFactorSpec::default()
        },
    };
    assert_eq!(family_members(&explicit).unwrap(), vec![46, 58]);
}

#[test]
fn range_mode_takes_every_prime_in_range() {
    let scheme = FamilyScheme {
        families: vec![vec![2], vec![3]],
        identity_factor: IdentityFactorSpec {
            mode: IdentityMode::Range,
            range_min: 5,
            range_max: 13,
            ..IdentityFactorSpec::default()
        },
    };
    assert_eq!(
        family_members(&scheme).unwrap(),
        vec![10, 14, 15, 21, 22, 26, 33, 39]
    );
}

#[test]
fn non_prime_family_factors_are_rejected() {
    let scheme = FamilyScheme {
        families: vec![vec![2, 4]],
        identity_factor: IdentityFactorSpec::default(),
    };
    let err = family_members(&scheme).expect_err("non prime factor");
    assert_eq!(err.info().context["factor"], "4");
}

#[test]
fn unbounded_count_stops_at_the_first_overflow() {
    let primorial_47 = vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
    let scheme = FamilyScheme {
        families: vec![primorial_47],
        identity_factor: IdentityFactorSpec {
            count: usize::MAX,
            ..IdentityFactorSpec::default()
        },
    };
    // 614889782588491410 * 53 exceeds u64
    let err = family_members(&scheme).expect_err("overflow");
    assert_eq!(err.info().code, "generate.overflow");
}
