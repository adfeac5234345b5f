//! Dice and dominance analysis.

mod distribution;
mod probability;

pub use distribution::{Dice, DiceError, FACE_COUNT};
pub use probability::{
    analyze, find_dominance_cycles, win_probability, DiceSetAnalysis, DominanceCycle,
    ProbabilityMatrix, SELF_PROBABILITY,
};
