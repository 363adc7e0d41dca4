use crate::domain::error::{AppError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PartialScore {
    pub possible: i64,
    pub achieved: i64,
    pub reasoning: String,
    /// Set when the achieved value falls outside `0..=possible`. The value is
    /// kept as reported.
    pub out_of_range: bool,
}

impl PartialScore {
    pub fn new(possible: i64, achieved: i64, reasoning: impl Into<String>) -> Self {
        Self {
            possible,
            achieved,
            reasoning: reasoning.into(),
            out_of_range: achieved < 0 || achieved > possible,
        }
    }
}

/// Sum of partial scores. Totals are maintained on every push so they never
/// drift from the parts.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ScoreResult {
    achieved: i64,
    possible: i64,
    parts: Vec<PartialScore>,
}

impl ScoreResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part to the totals. A part that would overflow either total is
    /// rejected and the result is left unchanged.
    pub fn push(&mut self, part: PartialScore) -> Result<()> {
        let achieved = self.achieved.checked_add(part.achieved);
        let possible = self.possible.checked_add(part.possible);
        let (Some(achieved), Some(possible)) = (achieved, possible) else {
            return Err(AppError::ScoreParseError(format!(
                "score total overflows after {} parts",
                self.parts.len()
            )));
        };

        self.achieved = achieved;
        self.possible = possible;
        self.parts.push(part);
        Ok(())
    }

    pub fn achieved(&self) -> i64 {
        self.achieved
    }

    pub fn possible(&self) -> i64 {
        self.possible
    }

    pub fn parts(&self) -> &[PartialScore] {
        &self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_follow_parts() {
        let mut result = ScoreResult::new();
        result.push(PartialScore::new(50, 30, "decent")).unwrap();
        result.push(PartialScore::new(20, 20, "great")).unwrap();
        result.push(PartialScore::new(2, 1, "keywords")).unwrap();

        assert_eq!(result.achieved(), 51);
        assert_eq!(result.possible(), 72);
        assert_eq!(
            result.achieved(),
            result.parts().iter().map(|p| p.achieved).sum::<i64>()
        );
        assert_eq!(
            result.possible(),
            result.parts().iter().map(|p| p.possible).sum::<i64>()
        );
    }

    #[test]
    fn test_out_of_range_is_flagged_not_clamped() {
        let part = PartialScore::new(10, 120, "overly generous");
        assert!(part.out_of_range);
        assert_eq!(part.achieved, 120);

        let negative = PartialScore::new(10, -3, "harsh");
        assert!(negative.out_of_range);

        assert!(!PartialScore::new(10, 10, "max").out_of_range);
        assert!(!PartialScore::new(0, 0, "empty").out_of_range);
    }

    #[test]
    fn test_overflowing_part_is_rejected() {
        let mut result = ScoreResult::new();
        result.push(PartialScore::new(10, i64::MAX, "huge")).unwrap();

        let err = result.push(PartialScore::new(10, 1, "one more")).unwrap_err();
        assert!(matches!(err, AppError::ScoreParseError(_)));
        assert_eq!(result.achieved(), i64::MAX);
        assert_eq!(result.possible(), 10);
        assert_eq!(result.parts().len(), 1);

        let mut wide = ScoreResult::new();
        wide.push(PartialScore::new(i64::MAX, 0, "wide")).unwrap();
        assert!(wide.push(PartialScore::new(1, 0, "wider")).is_err());
        assert_eq!(wide.possible(), i64::MAX);
    }

    #[test]
    fn test_empty_result() {
        let result = ScoreResult::new();
        assert_eq!(result.achieved(), 0);
        assert_eq!(result.possible(), 0);
        assert!(result.parts().is_empty());
    }
}
