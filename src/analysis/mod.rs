//! Offline schematic analysis: tallies, similarity, reports

pub mod tally;
pub mod similarity;
pub mod report;

pub use similarity::{Similarity, SimilarityRanking, rank_directory, similarity};
pub use tally::{
    BatchTally, BlockRanking, STACK_SIZE, STACKS_PER_CONTAINER, Tally, rank_by_block,
    scan_directory,
};
