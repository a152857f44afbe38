use super::*;
use crate::chain::MockBlockSource;
use crate::oracle::index::{reduce, MAX_DRAW_ATTEMPTS, NONCE_WRAP};
use proptest::prelude::*;

fn hashless_chain() -> MockBlockSource {
    let mut blocks = MockBlockSource::new();
    blocks.expect_block_hash().returning(|_| None);
    blocks
}

#[test]
fn test_draw_stays_in_range_and_advances_nonce() {
    let chain = chain();
    let mut generator = IndexGenerator::new();
    for n in 0..40u64 {
        let index = generator.draw(&chain, chain.height(), &Principal::from_label("oracle"));
        assert!(index < MAX_INDEX);
        assert_eq!(generator.nonce(), n + 1);
    }
}

#[test]
fn test_nonce_wraps_after_limit() {
    let chain = chain();
    let mut generator = IndexGenerator::with_nonce(NONCE_WRAP - 1);
    generator.draw(&chain, chain.height(), &airline());
    assert_eq!(generator.nonce(), NONCE_WRAP);
    generator.draw(&chain, chain.height(), &airline());
    assert_eq!(generator.nonce(), 0);
}

#[test]
fn test_same_nonce_gives_same_index() {
    let chain = chain();
    let account = Principal::from_label("oracle");
    let mut first = IndexGenerator::with_nonce(17);
    let mut second = first.clone();
    assert_eq!(
        first.draw(&chain, chain.height(), &account),
        second.draw(&chain, chain.height(), &account)
    );
}

#[test]
fn test_missing_block_hash_falls_back_to_zero_seed() {
    let blocks = hashless_chain();
    let account = Principal::from_label("oracle");
    let a = IndexGenerator::with_nonce(0).draw(&blocks, 5, &account);
    let b = IndexGenerator::with_nonce(3).draw(&blocks, 5, &account);
    // Nonce larger than the height also yields the zero seed
    let c = IndexGenerator::with_nonce(9).draw(&blocks, 5, &account);
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_distinct_draw_gives_up_after_one_nonce_cycle() {
    let blocks = hashless_chain();
    let account = Principal::from_label("oracle");
    let mut generator = IndexGenerator::new();
    let stuck = generator.draw(&blocks, 5, &account);

    let err = generator
        .draw_distinct(&blocks, 5, &account, &[stuck])
        .unwrap_err();
    assert_eq!(
        err,
        SuretyError::IndexDerivationExhausted {
            attempts: MAX_DRAW_ATTEMPTS
        }
    );
    assert!(IndexGenerator::new()
        .generate_indexes(&blocks, 5, &account)
        .is_err());
}

#[test]
fn test_reduce_reads_digest_big_endian() {
    assert_eq!(reduce(&[0u8; 32], 10), 0);

    let mut digest = [0u8; 32];
    digest[30] = 1;
    assert_eq!(reduce(&digest, 10), 6); // 256 mod 10

    // 2^256 - 1 ends in 5
    assert_eq!(reduce(&[0xff; 32], 10), 5);
}

proptest! {
    #[test]
    fn prop_generated_indexes_are_distinct(label in "[a-z0-9]{1,16}", nonce in 0u64..=NONCE_WRAP) {
        let chain = chain();
        let mut generator = IndexGenerator::with_nonce(nonce);
        let indexes = generator
            .generate_indexes(&chain, chain.height(), &Principal::from_label(&label))
            .unwrap();
        prop_assert!(indexes.iter().all(|i| *i < MAX_INDEX));
        prop_assert_ne!(indexes[0], indexes[1]);
        prop_assert_ne!(indexes[0], indexes[2]);
        prop_assert_ne!(indexes[1], indexes[2]);
    }
}
