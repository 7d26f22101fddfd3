use std::collections::{HashMap, HashSet};

use collab_graph_canvas::{
	Direction, FilterQuery, GraphConfig, GraphStore, GraphView, Member, NodeSpec, Placement,
	PointerOutcome, Relationship, TeamData, average_incoming_score, filter, resolve,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const IDS: [&str; 5] = ["a", "b", "c", "d", "e"];

fn member(id: &str, label: &str, department: &str, at: Option<(f64, f64)>) -> Member {
	Member {
		id: id.into(),
		label: label.into(),
		role: "Engineer".into(),
		department: department.into(),
		x: at.map(|p| p.0),
		y: at.map(|p| p.1),
	}
}

fn rel(source: &str, target: &str, score: i64, timestamp: &str) -> Relationship {
	Relationship {
		source: source.into(),
		target: target.into(),
		score,
		direction: Direction::Outgoing,
		timestamp: timestamp.into(),
	}
}

fn pair(a: &str, b: &str) -> (String, String) {
	if a <= b {
		(a.into(), b.into())
	} else {
		(b.into(), a.into())
	}
}

// Distinct endpoints, random score and day.
fn relationship_strategy() -> impl Strategy<Value = Relationship> {
	(0..IDS.len(), 1..IDS.len(), 0i64..=4, 1u32..=28).prop_map(|(s, step, score, day)| {
		let t = (s + step) % IDS.len();
		rel(IDS[s], IDS[t], score, &format!("2024-05-{day:02}T12:00:00Z"))
	})
}

proptest! {
	#[test]
	fn one_edge_per_direction_per_pair(rels in prop::collection::vec(relationship_strategy(), 0..40)) {
		let mut directions: HashMap<(String, String), HashSet<(String, String)>> = HashMap::new();
		for r in &rels {
			directions
				.entry(pair(&r.source, &r.target))
				.or_default()
				.insert((r.source.clone(), r.target.clone()));
		}

		let mut rendered: HashMap<(String, String), usize> = HashMap::new();
		for e in resolve(&rels) {
			*rendered.entry(pair(&e.from, &e.to)).or_default() += 1;
		}

		prop_assert_eq!(rendered.len(), directions.len());
		for (key, dirs) in &directions {
			prop_assert_eq!(rendered.get(key).copied(), Some(dirs.len()));
		}
	}

	#[test]
	fn empty_average_is_zero(id in "[a-z]{0,8}") {
		prop_assert_eq!(average_incoming_score(&id, &[]), 0.0);
	}

	#[test]
	fn repeated_sync_keeps_positions(seed in any::<u64>(), count in 1usize..12) {
		let specs: Vec<NodeSpec> = (0..count)
			.map(|i| NodeSpec {
				id: format!("m{i}"),
				label: format!("Member {i}"),
				size: 10.0,
				color: "#5FA8D3",
				hint: None,
			})
			.collect();
		let rels: Vec<Relationship> = (1..count)
			.map(|i| rel(&format!("m{i}"), "m0", 2, ""))
			.collect();
		let edges = resolve(&rels);

		let mut store = GraphStore::new(seed);
		store.sync(&specs, &edges, Placement::Scatter { extent: 200.0 });
		let before: Vec<_> = store.nodes().map(|n| (n.id.clone(), n.position())).collect();
		let edges_before = store.edges().to_vec();

		store.sync(&specs, &edges, Placement::Scatter { extent: 200.0 });
		let after: Vec<_> = store.nodes().map(|n| (n.id.clone(), n.position())).collect();
		prop_assert_eq!(before, after);
		prop_assert_eq!(edges_before, store.edges().to_vec());
	}
}

fn alice_team() -> (Vec<Member>, Vec<Relationship>) {
	(
		vec![
			member("alice", "Alice", "R&D", None),
			member("bob", "Bob", "R&D", None),
			member("carol", "Carol", "Ops", None),
		],
		vec![rel("alice", "bob", 3, ""), rel("bob", "carol", 2, "")],
	)
}

#[test]
fn name_filter_keeps_match_and_neighbours_only() {
	let (members, rels) = alice_team();
	let (nodes, edges) = filter(&members, &rels, &FilterQuery::new("Alice", ""));

	let ids: Vec<&str> = nodes.iter().map(|m| m.id.as_str()).collect();
	assert_eq!(ids, vec!["alice", "bob"]);
	assert_eq!(edges, vec![rel("alice", "bob", 3, "")]);
}

#[test]
fn empty_query_is_identity() {
	let (members, rels) = alice_team();
	let (nodes, edges) = filter(&members, &rels, &FilterQuery::default());
	assert_eq!(nodes, members);
	assert_eq!(edges, rels);
}

#[test]
fn reciprocal_pair_bends_both_ways() {
	let edges = resolve(&[rel("a", "b", 2, ""), rel("b", "a", 4, "")]);
	assert_eq!(edges.len(), 2);
	assert!(edges.iter().all(|e| e.curve_offset != 0.0));
	assert!(edges[0].curve_offset.signum() == -edges[1].curve_offset.signum());
}

fn placed_team() -> TeamData {
	TeamData {
		nodes: vec![
			member("alice", "Alice", "R&D", Some((0.0, 0.0))),
			member("bob", "Bob", "R&D", Some((150.0, 0.0))),
		],
		edges: vec![rel("alice", "bob", 3, "2024-05-01T12:00:00Z")],
	}
}

// Default camera: graph origin at the centre of an 800x600 viewport, k = 1.
fn mounted() -> GraphView {
	let mut view = GraphView::new(800.0, 600.0, GraphConfig::default());
	view.apply(&placed_team(), &FilterQuery::default(), 10.0);
	view
}

#[test]
fn dropped_node_survives_refresh() {
	let mut view = mounted();
	assert_eq!(view.store().node("alice").map(|n| n.position()), Some((0.0, 0.0)));

	view.pointer_down(400.0, 300.0);
	view.pointer_move(430.0, 360.0);
	view.pointer_up();
	view.apply(&placed_team(), &FilterQuery::default(), 10.0);

	assert_eq!(view.store().node("alice").map(|n| n.position()), Some((30.0, 60.0)));
}

fn evaluations(outcomes: impl IntoIterator<Item = PointerOutcome>) -> Vec<String> {
	outcomes
		.into_iter()
		.filter_map(|o| match o {
			PointerOutcome::Evaluate(id) => Some(id),
			_ => None,
		})
		.collect()
}

#[test]
fn click_evaluates_once_and_drag_never_does() {
	let mut view = mounted();
	let click = [view.pointer_down(550.0, 300.0), view.pointer_up()];
	assert_eq!(evaluations(click), vec!["bob".to_string()]);

	let drag = [
		view.pointer_down(550.0, 300.0),
		view.pointer_move(520.0, 330.0),
		view.pointer_up(),
	];
	assert!(evaluations(drag).is_empty());
}

#[test]
fn background_click_evaluates_nobody() {
	let mut view = mounted();
	let outcomes = [view.pointer_down(100.0, 100.0), view.pointer_up()];
	assert!(evaluations(outcomes).is_empty());
}
