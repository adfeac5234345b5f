//! Six-sided dice with arbitrary integer faces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Faces on every die
pub const FACE_COUNT: usize = 6;

/// Errors building a die
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid distribution: expected 6 faces, found {0}")]
    WrongFaceCount(usize),

    #[error("Invalid distribution: face {position} ({text:?}) is not an integer")]
    NonIntegerFace { position: usize, text: String },
}

/// A die: exactly six integer faces, duplicates and negatives allowed
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Dice {
    faces: [i64; FACE_COUNT],
}

impl Dice {
    /// Create from face values
    pub fn new(faces: &[i64]) -> Result<Self, DiceError> {
        let faces: [i64; FACE_COUNT] = faces
            .try_into()
            .map_err(|_| DiceError::WrongFaceCount(faces.len()))?;
        Ok(Self { faces })
    }

    pub fn faces(&self) -> &[i64] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Face at `index`, if there is one
    pub fn face(&self, index: usize) -> Option<i64> {
        self.faces.get(index).copied()
    }

    /// Number of face pairings in which this die shows the higher value
    pub fn wins_against(&self, other: &Dice) -> usize {
        self.faces
            .iter()
            .map(|&a| other.faces.iter().filter(|&&b| a > b).count())
            .sum()
    }
}

impl TryFrom<Vec<i64>> for Dice {
    type Error = DiceError;

    fn try_from(faces: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(&faces)
    }
}

impl From<Dice> for Vec<i64> {
    fn from(dice: Dice) -> Self {
        dice.faces.to_vec()
    }
}

impl FromStr for Dice {
    type Err = DiceError;

    /// Parse comma-separated faces such as `"2,2,4,4,9,9"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let faces = s
            .split(',')
            .enumerate()
            .map(|(i, part)| {
                let text = part.trim();
                text.parse::<i64>().map_err(|_| DiceError::NonIntegerFace {
                    position: i + 1,
                    text: text.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&faces)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, face) in self.faces.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", face)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_six_faces() {
        assert!(Dice::new(&[1, 2, 3, 4, 5, 6]).is_ok());
        assert_eq!(
            Dice::new(&[1, 2, 3, 4, 5]),
            Err(DiceError::WrongFaceCount(5))
        );
        assert_eq!(
            Dice::new(&[1, 2, 3, 4, 5, 6, 7]),
            Err(DiceError::WrongFaceCount(7))
        );
        assert_eq!(Dice::new(&[]), Err(DiceError::WrongFaceCount(0)));
    }

    #[test]
    fn test_duplicates_and_negatives_allowed() {
        let dice = Dice::new(&[-3, -3, 0, 0, 12, 12]).unwrap();
        assert_eq!(dice.faces(), &[-3, -3, 0, 0, 12, 12]);
    }

    #[test]
    fn test_parse_and_display() {
        let dice: Dice = " 2, 2,4 ,4,9,9".parse().unwrap();
        assert_eq!(dice.faces(), &[2, 2, 4, 4, 9, 9]);
        assert_eq!(dice.to_string(), "2,2,4,4,9,9");
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        assert_eq!(
            "1,2,3.5,4,5,6".parse::<Dice>(),
            Err(DiceError::NonIntegerFace {
                position: 3,
                text: "3.5".into()
            })
        );
        assert!(matches!(
            "1,2,,4,5,6".parse::<Dice>(),
            Err(DiceError::NonIntegerFace { position: 3, .. })
        ));
        assert!(matches!(
            "a,b,c,d,e,f".parse::<Dice>(),
            Err(DiceError::NonIntegerFace { position: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        assert_eq!(
            "1,2,3".parse::<Dice>(),
            Err(DiceError::WrongFaceCount(3))
        );
    }

    #[test]
    fn test_face_lookup() {
        let dice = Dice::new(&[1, 1, 6, 6, 8, 8]).unwrap();
        assert_eq!(dice.face_count(), 6);
        assert_eq!(dice.face(2), Some(6));
        assert_eq!(dice.face(6), None);
    }

    #[test]
    fn test_wins_against_ignores_ties() {
        let a = Dice::new(&[1, 1, 1, 1, 1, 1]).unwrap();
        assert_eq!(a.wins_against(&a), 0);

        let b = Dice::new(&[2, 2, 2, 2, 2, 2]).unwrap();
        assert_eq!(b.wins_against(&a), 36);
        assert_eq!(a.wins_against(&b), 0);
    }

    #[test]
    fn test_serde_validates_face_count() {
        let dice: Dice = serde_json::from_str("[1,2,3,4,5,6]").unwrap();
        assert_eq!(serde_json::to_string(&dice).unwrap(), "[1,2,3,4,5,6]");
        assert!(serde_json::from_str::<Dice>("[1,2,3]").is_err());
    }
}
