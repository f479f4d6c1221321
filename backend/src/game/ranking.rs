/// A user's aggregate standing recomputed from their score history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingUpdate {
    pub ranking_score: i32,
    pub completed_games: i32,
}

pub struct Ranking;

impl Ranking {
    /// Integer-truncated mean of all points, plus the number of finished games.
    ///
    /// `points` must hold every score the user has, including the one just
    /// recorded. Re-running with the same history yields the same update.
    pub fn recompute(points: &[i32]) -> RankingUpdate {
        if points.is_empty() {
            return RankingUpdate {
                ranking_score: 0,
                completed_games: 0,
            };
        }

        let total: i64 = points.iter().map(|&p| i64::from(p)).sum();
        let count = i64::try_from(points.len()).unwrap_or(i64::MAX);

        RankingUpdate {
            // Mean of i32 values always fits in i32
            ranking_score: i32::try_from(total / count).unwrap_or(i32::MAX),
            completed_games: i32::try_from(count).unwrap_or(i32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_three_games() {
        let update = Ranking::recompute(&[2, 4, 3]);
        assert_eq!(update.ranking_score, 3);
        assert_eq!(update.completed_games, 3);
    }

    #[test]
    fn test_mean_truncates() {
        // 1 + 2 = 3, 3 / 2 = 1
        assert_eq!(Ranking::recompute(&[1, 2]).ranking_score, 1);
    }

    #[test]
    fn test_mean_is_not_a_running_division() {
        // Dividing inside the accumulation would give ((5/3 + 5)/3 + 5)/3 = 2
        assert_eq!(Ranking::recompute(&[5, 5, 5]).ranking_score, 5);
    }

    #[test]
    fn test_losses_pull_the_mean_down() {
        assert_eq!(Ranking::recompute(&[6, 0, 0]).ranking_score, 2);
    }

    #[test]
    fn test_no_scores() {
        let update = Ranking::recompute(&[]);
        assert_eq!(update.ranking_score, 0);
        assert_eq!(update.completed_games, 0);
    }
}
