pub mod block_tests;
