use crate::chain::block::BLOCK_HASH_WINDOW;
use crate::chain::{BlockSource, SimulatedChain};

#[test]
fn test_current_block_has_no_hash() {
    let chain = SimulatedChain::at_height("seed", 10);
    assert!(chain.block_hash(10).is_none());
    assert!(chain.block_hash(11).is_none());
    assert!(chain.block_hash(9).is_some());
}

#[test]
fn test_hash_window_is_bounded() {
    let chain = SimulatedChain::at_height("seed", 1_000);
    assert!(chain.block_hash(1_000 - BLOCK_HASH_WINDOW).is_some());
    assert!(chain.block_hash(1_000 - BLOCK_HASH_WINDOW - 1).is_none());
}

#[test]
fn test_hashes_are_stable_and_seeded() {
    let a = SimulatedChain::at_height("seed-a", 50);
    let b = SimulatedChain::at_height("seed-b", 50);

    assert_eq!(a.block_hash(40), a.block_hash(40));
    assert_ne!(a.block_hash(40), a.block_hash(41));
    assert_ne!(a.block_hash(40), b.block_hash(40));
}

#[test]
fn test_mine_advances_height() {
    let chain = SimulatedChain::new("seed");
    assert_eq!(chain.height(), 1);
    assert_eq!(chain.mine(), 2);
    assert_eq!(chain.advance(8), 10);
    assert_eq!(chain.height(), 10);
}
