use std::collections::HashSet;

use log::warn;

use super::edges::{RenderEdge, resolve};
use super::filter::{FilterQuery, filter};
use super::score::{SizePolicy, node_color};
use super::state::NodeSpec;
use super::types::{Relationship, TeamData};

/// Store-ready snapshot: styled nodes and resolved edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreparedGraph {
	pub nodes: Vec<NodeSpec>,
	pub edges: Vec<RenderEdge>,
}

/// Filter, then style nodes and resolve edges.
///
/// Sizes and colors are scored against the whole dataset so a member keeps
/// its band whatever the filter hides.
pub fn prepare(
	data: &TeamData,
	query: &FilterQuery,
	sizing: &dyn SizePolicy,
	base_size: f64,
) -> PreparedGraph {
	let known: HashSet<&str> = data.nodes.iter().map(|m| m.id.as_str()).collect();
	let valid: Vec<Relationship> = data
		.edges
		.iter()
		.filter(|r| {
			let ok = known.contains(r.source.as_str()) && known.contains(r.target.as_str());
			if !ok {
				warn!("relationship {} -> {} references an unknown member", r.source, r.target);
			}
			ok
		})
		.cloned()
		.collect();

	let (members, relationships) = filter(&data.nodes, &valid, query);

	let nodes = members
		.iter()
		.map(|m| NodeSpec {
			id: m.id.clone(),
			label: m.label.clone(),
			size: sizing.node_size(base_size, &m.id, &valid),
			color: node_color(&m.id, &valid),
			hint: m.x.zip(m.y),
		})
		.collect();

	PreparedGraph {
		nodes,
		edges: resolve(&relationships),
	}
}
