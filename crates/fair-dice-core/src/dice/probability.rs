//! Pairwise win probabilities and non-transitive dominance cycles.

use super::Dice;
use serde::Serialize;
use std::ops::Index;

/// Probability a die is considered to beat itself
pub const SELF_PROBABILITY: f64 = 0.5;

/// Probability that `d1` rolls strictly higher than `d2`. Ties count for neither.
pub fn win_probability(d1: &Dice, d2: &Dice) -> f64 {
    let total = d1.face_count() * d2.face_count();
    d1.wins_against(d2) as f64 / total as f64
}

/// Square matrix of win probabilities, row die against column die
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbabilityMatrix {
    size: usize,
    entries: Vec<f64>,
}

impl ProbabilityMatrix {
    /// Compute every pairing; the diagonal is fixed at 0.5
    pub fn build(dice: &[Dice]) -> Self {
        let size = dice.len();
        let mut entries = Vec::with_capacity(size * size);
        for (i, row) in dice.iter().enumerate() {
            for (j, column) in dice.iter().enumerate() {
                entries.push(if i == j {
                    SELF_PROBABILITY
                } else {
                    win_probability(row, column)
                });
            }
        }
        Self { size, entries }
    }

    /// Number of dice
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.size && column < self.size {
            Some(self.entries[row * self.size + column])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.entries.chunks(self.size.max(1))
    }
}

impl Index<(usize, usize)> for ProbabilityMatrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        assert!(
            row < self.size && column < self.size,
            "index ({}, {}) outside {}x{} matrix",
            row,
            column,
            self.size,
            self.size
        );
        &self.entries[row * self.size + column]
    }
}

/// `a` beats `b`, `b` beats `c`, `c` beats `a`, each with probability above one half
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DominanceCycle {
    pub indices: [usize; 3],
    /// `P(a > b)`, `P(b > c)`, `P(c > a)`
    pub probabilities: [f64; 3],
}

/// Every ordered triple of distinct dice forming a cycle, in lexicographic order.
///
/// A cycle is listed once per starting die, so `(0,1,2)`, `(1,2,0)` and
/// `(2,0,1)` all appear.
pub fn find_dominance_cycles(matrix: &ProbabilityMatrix) -> Vec<DominanceCycle> {
    let n = matrix.size();
    let mut cycles = Vec::new();

    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                if a == b || b == c || c == a {
                    continue;
                }
                let probabilities = [matrix[(a, b)], matrix[(b, c)], matrix[(c, a)]];
                if probabilities.iter().all(|p| *p > 0.5) {
                    cycles.push(DominanceCycle {
                        indices: [a, b, c],
                        probabilities,
                    });
                }
            }
        }
    }

    cycles
}

/// Summary of a dice set
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiceSetAnalysis {
    /// Mean win probability of each die against all the others
    pub average_win_rates: Vec<f64>,
    pub has_non_transitive: bool,
}

pub fn analyze(matrix: &ProbabilityMatrix) -> DiceSetAnalysis {
    let n = matrix.size();
    let average_win_rates = (0..n)
        .map(|i| {
            if n < 2 {
                return 0.0;
            }
            let total: f64 = (0..n).filter(|&j| j != i).map(|j| matrix[(i, j)]).sum();
            total / (n - 1) as f64
        })
        .collect();

    DiceSetAnalysis {
        average_win_rates,
        has_non_transitive: !find_dominance_cycles(matrix).is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn dice(faces: &[i64]) -> Dice {
        Dice::new(faces).unwrap()
    }

    fn classic_set() -> Vec<Dice> {
        vec![
            dice(&[2, 2, 4, 4, 9, 9]),
            dice(&[1, 1, 6, 6, 8, 8]),
            dice(&[3, 3, 5, 5, 7, 7]),
        ]
    }

    #[test]
    fn test_classic_set_win_probabilities() {
        let set = classic_set();
        let expected = 20.0 / 36.0;

        assert!((win_probability(&set[0], &set[1]) - expected).abs() < EPSILON);
        assert!((win_probability(&set[1], &set[2]) - expected).abs() < EPSILON);
        assert!((win_probability(&set[2], &set[0]) - expected).abs() < EPSILON);
    }

    #[test]
    fn test_classic_set_cycle_reported_once_per_rotation() {
        let matrix = ProbabilityMatrix::build(&classic_set());
        let cycles = find_dominance_cycles(&matrix);

        let indices: Vec<[usize; 3]> = cycles.iter().map(|c| c.indices).collect();
        assert_eq!(indices, vec![[0, 1, 2], [1, 2, 0], [2, 0, 1]]);
        for cycle in &cycles {
            for p in cycle.probabilities {
                assert!((p - 20.0 / 36.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_ties_count_for_neither_side() {
        let a = dice(&[1, 2, 3, 4, 5, 6]);
        let b = dice(&[1, 2, 3, 4, 5, 6]);
        let p_ab = win_probability(&a, &b);
        let p_ba = win_probability(&b, &a);

        assert!((p_ab - 15.0 / 36.0).abs() < EPSILON);
        assert!((p_ab + p_ba - 30.0 / 36.0).abs() < EPSILON);
    }

    #[test]
    fn test_without_ties_pairs_sum_to_one() {
        let set = classic_set();
        let matrix = ProbabilityMatrix::build(&set);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!((matrix[(i, j)] + matrix[(j, i)] - 1.0).abs() < EPSILON);
                }
            }
        }
    }

    #[test]
    fn test_diagonal_is_half() {
        let set = vec![
            dice(&[1, 1, 1, 1, 1, 1]),
            dice(&[1, 2, 3, 4, 5, 6]),
            dice(&[-5, 0, 0, 7, 7, 100]),
            dice(&[9, 9, 9, 9, 9, 9]),
        ];
        let matrix = ProbabilityMatrix::build(&set);

        assert_eq!(matrix.size(), 4);
        for i in 0..4 {
            assert_eq!(matrix[(i, i)], 0.5);
        }
    }

    #[test]
    fn test_entries_within_unit_interval() {
        let set = vec![
            dice(&[0, 0, 0, 0, 0, 0]),
            dice(&[10, 10, 10, 10, 10, 10]),
            dice(&[-1, 3, 3, 8, 8, 11]),
        ];
        let matrix = ProbabilityMatrix::build(&set);

        assert_eq!(matrix[(1, 0)], 1.0);
        assert_eq!(matrix[(0, 1)], 0.0);
        for row in matrix.rows() {
            assert_eq!(row.len(), 3);
            assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_transitive_set_has_no_cycles() {
        let set = vec![
            dice(&[1, 1, 1, 1, 1, 1]),
            dice(&[2, 2, 2, 2, 2, 2]),
            dice(&[3, 3, 3, 3, 3, 3]),
        ];
        let matrix = ProbabilityMatrix::build(&set);

        assert!(find_dominance_cycles(&matrix).is_empty());
        assert!(!analyze(&matrix).has_non_transitive);
    }

    #[test]
    fn test_empty_and_small_sets() {
        let empty = ProbabilityMatrix::build(&[]);
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.rows().count(), 0);
        assert!(find_dominance_cycles(&empty).is_empty());

        let pair = ProbabilityMatrix::build(&classic_set()[..2]);
        assert!(find_dominance_cycles(&pair).is_empty());
        assert_eq!(pair.get(2, 0), None);
    }

    #[test]
    fn test_analysis_average_win_rates() {
        let matrix = ProbabilityMatrix::build(&classic_set());
        let analysis = analyze(&matrix);

        assert!(analysis.has_non_transitive);
        for rate in analysis.average_win_rates {
            // 20/36 against one neighbour, 16/36 against the other
            assert!((rate - 0.5).abs() < EPSILON);
        }
    }
}
