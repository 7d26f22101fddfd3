use indexmap::IndexMap;
use log::warn;

use super::score::{ColorToken, score_to_color};
use super::types::{MemberId, Point, Relationship};

/// Perpendicular bend of each arrow in a bidirectional pair, as a fraction of
/// the segment length.
pub const CURVE_FRACTION: f64 = 0.2;

/// One drawable arrow.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
	/// Tail member.
	pub from: MemberId,
	/// Head member, where the arrowhead sits.
	pub to: MemberId,
	/// Score carried by the arrow.
	pub score: i64,
	/// Set when the opposite direction is drawn too.
	pub bidirectional: bool,
	/// Signed bend relative to the pair's canonical axis (lower id to higher
	/// id). Zero draws a straight arrow.
	pub curve_offset: f64,
	/// Band color of `score`.
	pub color: ColorToken,
	/// Text drawn at the arrow's midpoint.
	pub label: String,
}

impl RenderEdge {
	fn new(rel: &Relationship, curve_offset: f64) -> Self {
		Self {
			from: rel.source.clone(),
			to: rel.target.clone(),
			score: rel.score,
			bidirectional: curve_offset != 0.0,
			curve_offset,
			color: score_to_color(rel.score),
			label: rel.score.to_string(),
		}
	}

	/// Whether the arrow is drawn as a curve.
	pub fn is_curved(&self) -> bool {
		self.curve_offset != 0.0
	}

	/// Quadratic control point for the edge drawn between `from` and `to`.
	/// The perpendicular is taken from the canonical axis so both arrows of
	/// a pair bend to opposite sides.
	pub fn control_point(&self, from: Point, to: Point) -> Point {
		let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
		let (a, b) = if self.from <= self.to { (from, to) } else { (to, from) };
		let (dx, dy) = (b.0 - a.0, b.1 - a.1);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 0.001 {
			return mid;
		}
		let (px, py) = (-dy / len, dx / len);
		(
			mid.0 + px * self.curve_offset * len,
			mid.1 + py * self.curve_offset * len,
		)
	}
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
	if a <= b { (a, b) } else { (b, a) }
}

/// Turns relationships into drawable edges: one straight arrow per
/// one-way pair, two opposite curves per two-way pair. Pairs carrying more
/// than one relationship per direction keep only the most recent one.
pub fn resolve(relationships: &[Relationship]) -> Vec<RenderEdge> {
	let mut groups: IndexMap<(&str, &str), Vec<&Relationship>> = IndexMap::new();
	for rel in relationships {
		if rel.source == rel.target {
			warn!("skipping self-evaluation of {}", rel.source);
			continue;
		}
		groups
			.entry(pair_key(&rel.source, &rel.target))
			.or_default()
			.push(rel);
	}

	let mut edges = Vec::with_capacity(relationships.len());
	for ((low, high), group) in groups {
		let mut forward: Option<&Relationship> = None;
		let mut backward: Option<&Relationship> = None;
		for &rel in &group {
			let slot = if rel.source == low { &mut forward } else { &mut backward };
			if slot.is_none_or(|kept| rel.recency_key() >= kept.recency_key()) {
				*slot = Some(rel);
			}
		}

		let kept = usize::from(forward.is_some()) + usize::from(backward.is_some());
		if kept < group.len() {
			warn!(
				"{} relationships between {low} and {high}, keeping the most recent per direction",
				group.len()
			);
		}

		match (forward, backward) {
			(Some(f), Some(b)) => {
				edges.push(RenderEdge::new(f, CURVE_FRACTION));
				edges.push(RenderEdge::new(b, -CURVE_FRACTION));
			}
			(Some(only), None) | (None, Some(only)) => edges.push(RenderEdge::new(only, 0.0)),
			(None, None) => {}
		}
	}
	edges
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::collab_graph::types::Direction;

	fn rel(source: &str, target: &str, score: i64, timestamp: &str) -> Relationship {
		Relationship {
			source: source.into(),
			target: target.into(),
			score,
			direction: Direction::Outgoing,
			timestamp: timestamp.into(),
		}
	}

	#[test]
	fn single_relationship_is_straight() {
		let edges = resolve(&[rel("a", "b", 3, "")]);
		assert_eq!(edges.len(), 1);
		assert!(!edges[0].bidirectional);
		assert_eq!(edges[0].curve_offset, 0.0);
		assert_eq!(edges[0].label, "3");
		assert_eq!(edges[0].color, score_to_color(3));
	}

	#[test]
	fn opposite_relationships_curve_apart() {
		let edges = resolve(&[rel("a", "b", 2, ""), rel("b", "a", 4, "")]);
		assert_eq!(edges.len(), 2);
		assert!(edges.iter().all(|e| e.bidirectional));
		assert!(edges[0].curve_offset != 0.0);
		assert_eq!(edges[0].curve_offset, -edges[1].curve_offset);
		assert_eq!((edges[0].score, edges[1].score), (2, 4));
	}

	#[test]
	fn control_points_land_on_opposite_sides() {
		let edges = resolve(&[rel("b", "a", 1, ""), rel("a", "b", 1, "")]);
		let (pa, pb) = ((0.0, 0.0), (100.0, 0.0));
		let pos = |id: &str| if id == "a" { pa } else { pb };
		let c0 = edges[0].control_point(pos(&edges[0].from), pos(&edges[0].to));
		let c1 = edges[1].control_point(pos(&edges[1].from), pos(&edges[1].to));

		assert_eq!(c0.0, 50.0);
		assert!((c0.1.abs() - 20.0).abs() < 1e-9);
		assert_eq!(c0.1, -c1.1);
	}

	#[test]
	fn duplicates_keep_most_recent_per_direction() {
		let edges = resolve(&[
			rel("a", "b", 1, "2024-01-01T00:00:00Z"),
			rel("a", "b", 3, "2024-06-01T00:00:00Z"),
			rel("b", "a", 0, "2024-02-01T00:00:00Z"),
			rel("a", "b", 2, "2024-03-01T00:00:00Z"),
		]);
		assert_eq!(edges.len(), 2);
		assert_eq!(edges[0].score, 3);
		assert_eq!(edges[1].score, 0);
	}

	#[test]
	fn same_direction_pair_collapses_to_one_arrow() {
		let edges = resolve(&[
			rel("a", "b", 4, "2024-06-01T00:00:00Z"),
			rel("a", "b", 1, "2024-01-01T00:00:00Z"),
		]);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].score, 4);
		assert!(!edges[0].is_curved());
	}

	#[test]
	fn self_evaluations_are_dropped() {
		assert!(resolve(&[rel("a", "a", 4, "")]).is_empty());
	}
}
