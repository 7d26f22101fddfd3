//! Score bands and the node encodings derived from incoming evaluations.

use serde::{Deserialize, Serialize};

use super::types::Relationship;

/// A CSS color string.
pub type ColorToken = &'static str;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreBand {
	pub score: i64,
	pub color: ColorToken,
	pub name: &'static str,
	pub description: &'static str,
}

pub const SCORE_BANDS: [ScoreBand; 5] = [
	ScoreBand {
		score: 0,
		color: "#DF7373",
		name: "None",
		description: "No collaboration exists or none is required.",
	},
	ScoreBand {
		score: 1,
		color: "#FA9500",
		name: "Low",
		description: "Rare, one-off cooperation.",
	},
	ScoreBand {
		score: 2,
		color: "#5FA8D3",
		name: "Moderate",
		description: "Periodically coordinated efforts.",
	},
	ScoreBand {
		score: 3,
		color: "#415D43",
		name: "Good",
		description: "Sustained collaboration with regular mutual help.",
	},
	ScoreBand {
		score: 4,
		color: "#111D13",
		name: "Optimal",
		description: "Complementary roles working towards shared goals.",
	},
];

/// Band for any integer score; out-of-range input clamps to the nearest band.
pub fn score_band(score: i64) -> &'static ScoreBand {
	&SCORE_BANDS[score.clamp(MIN_SCORE, MAX_SCORE) as usize]
}

pub fn score_to_color(score: i64) -> ColorToken {
	score_band(score).color
}

pub fn incoming_count(member_id: &str, relationships: &[Relationship]) -> usize {
	relationships.iter().filter(|r| r.target == member_id).count()
}

/// Mean score of every relationship targeting `member_id`, `0.0` when there is none.
pub fn average_incoming_score(member_id: &str, relationships: &[Relationship]) -> f64 {
	let (sum, count) = relationships
		.iter()
		.filter(|r| r.target == member_id)
		.fold((0i64, 0usize), |(sum, count), r| (sum + r.score, count + 1));
	if count == 0 {
		return 0.0;
	}
	(sum as f64 / count as f64).clamp(MIN_SCORE as f64, MAX_SCORE as f64)
}

/// Any positive average rounds up to the next band.
pub fn node_color(member_id: &str, relationships: &[Relationship]) -> ColorToken {
	score_to_color(average_incoming_score(member_id, relationships).ceil() as i64)
}

/// Node sizing policy. Implementations must be non-decreasing in incoming
/// score and count, and must return exactly `base_size` for a member nobody
/// has evaluated.
pub trait SizePolicy {
	fn node_size(&self, base_size: f64, member_id: &str, relationships: &[Relationship]) -> f64;
}

pub struct FlatSize;

impl SizePolicy for FlatSize {
	fn node_size(&self, base_size: f64, _: &str, _: &[Relationship]) -> f64 {
		base_size
	}
}

pub struct ScoreWeighted;

impl SizePolicy for ScoreWeighted {
	fn node_size(&self, base_size: f64, member_id: &str, relationships: &[Relationship]) -> f64 {
		base_size * (1.0 + average_incoming_score(member_id, relationships) * 0.5)
	}
}

pub struct EvaluationCount;

impl SizePolicy for EvaluationCount {
	fn node_size(&self, base_size: f64, member_id: &str, relationships: &[Relationship]) -> f64 {
		let count = incoming_count(member_id, relationships) as f64;
		base_size * (1.0 + count.ln_1p() * 0.25)
	}
}

/// Serializable selector for the built-in policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
	/// Every node gets the base size.
	Flat,
	/// Grows with the average incoming score.
	#[default]
	ScoreWeighted,
	/// Grows with the number of evaluations received.
	EvaluationCount,
}

impl SizingMode {
	/// The sizing rule this mode stands for.
	pub fn policy(self) -> &'static dyn SizePolicy {
		match self {
			SizingMode::Flat => &FlatSize,
			SizingMode::ScoreWeighted => &ScoreWeighted,
			SizingMode::EvaluationCount => &EvaluationCount,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::collab_graph::types::Direction;

	fn rel(source: &str, target: &str, score: i64) -> Relationship {
		Relationship {
			source: source.into(),
			target: target.into(),
			score,
			direction: Direction::Outgoing,
			timestamp: String::new(),
		}
	}

	#[test]
	fn average_of_nothing_is_zero() {
		assert_eq!(average_incoming_score("x", &[]), 0.0);
		assert_eq!(node_color("x", &[]), SCORE_BANDS[0].color);
	}

	#[test]
	fn average_only_counts_incoming() {
		let rels = [rel("a", "b", 4), rel("c", "b", 1), rel("b", "a", 0)];
		assert_eq!(average_incoming_score("b", &rels), 2.5);
		assert_eq!(average_incoming_score("a", &rels), 0.0);
		assert_eq!(incoming_count("b", &rels), 2);
	}

	#[test]
	fn color_rounds_up() {
		let rels = [rel("a", "b", 1), rel("c", "b", 2)];
		// 1.5 -> band 2
		assert_eq!(node_color("b", &rels), "#5FA8D3");
		let rels = [rel("a", "b", 1), rel("c", "b", 0), rel("d", "b", 0)];
		// 0.33 -> band 1
		assert_eq!(node_color("b", &rels), "#FA9500");
	}

	#[test]
	fn out_of_range_scores_clamp() {
		assert_eq!(score_to_color(-3), SCORE_BANDS[0].color);
		assert_eq!(score_to_color(9), SCORE_BANDS[4].color);
		assert_eq!(average_incoming_score("b", &[rel("a", "b", 12)]), 4.0);
	}

	#[test]
	fn policies_leave_isolated_nodes_at_base() {
		for mode in [SizingMode::Flat, SizingMode::ScoreWeighted, SizingMode::EvaluationCount] {
			assert_eq!(mode.policy().node_size(10.0, "z", &[rel("a", "b", 3)]), 10.0);
		}
	}

	#[test]
	fn policies_grow_with_evaluations() {
		let low = [rel("a", "b", 1)];
		let high = [rel("a", "b", 4), rel("c", "b", 4)];
		for mode in [SizingMode::ScoreWeighted, SizingMode::EvaluationCount] {
			let p = mode.policy();
			assert!(p.node_size(10.0, "b", &high) > p.node_size(10.0, "b", &low));
		}
		assert_eq!(ScoreWeighted.node_size(10.0, "b", &high), 30.0);
	}
}
