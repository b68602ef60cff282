//! Test assertion helpers - fluent API for verifying session views
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ScoreAssertion {
    session: Value,
}

impl ScoreAssertion {
    /// Fetches the current session view
    pub async fn for_session(setup: &TestSetup) -> Self {
        Self {
            session: setup.session().await,
        }
    }

    pub fn scores(&self) -> Vec<i64> {
        self.session["players"]
            .as_array()
            .expect("players should be an array")
            .iter()
            .map(|p| p["score"].as_i64().expect("score should be a number"))
            .collect()
    }

    pub fn has_scores(self, expected: &[i64]) -> Self {
        assert_eq!(self.scores(), expected, "unexpected scores");
        self
    }

    pub fn has_round_count(self, expected: usize) -> Self {
        let rounds = self.session["rounds"]
            .as_array()
            .expect("rounds should be an array");
        assert_eq!(rounds.len(), expected, "unexpected number of rounds");
        self
    }

    pub fn is_led_by(self, player_id: Option<u64>) -> Self {
        assert_eq!(
            self.session["leader_id"].as_u64(),
            player_id,
            "unexpected leader"
        );
        self
    }

    pub fn has_standings(self, expected: &[u64]) -> Self {
        let standings: Vec<u64> = self.session["standings"]
            .as_array()
            .expect("standings should be an array")
            .iter()
            .map(|id| id.as_u64().unwrap())
            .collect();
        assert_eq!(standings, expected, "unexpected standings");
        self
    }

    /// Every committed round sums to zero and is numbered by position
    pub fn rounds_are_consistent(self) -> Self {
        let rounds = self.session["rounds"].as_array().unwrap();
        for (index, round) in rounds.iter().enumerate() {
            assert_eq!(round["round_number"].as_u64(), Some(index as u64 + 1));
            let sum: i64 = round["deltas"]
                .as_object()
                .unwrap()
                .values()
                .map(|v| v.as_i64().unwrap())
                .sum();
            assert_eq!(sum, 0, "round {} is not zero-sum", index + 1);
        }

        let total: i64 = self.scores().iter().sum();
        assert_eq!(total, 0, "scores do not sum to zero");
        self
    }
}
