use std::collections::HashSet;
use std::f64::consts::PI;

use indexmap::IndexMap;
use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::camera::ViewTransform;
use super::edges::RenderEdge;
use super::score::ColorToken;
use super::types::{MemberId, Point};

/// Per-node input to [`GraphStore::sync`].
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
	/// Member id.
	pub id: MemberId,
	/// Label drawn next to the node.
	pub label: String,
	/// Radius in graph units.
	pub size: f64,
	/// Fill color.
	pub color: ColorToken,
	/// Position to use if the node is new to the store.
	pub hint: Option<Point>,
}

/// A positioned node owned by [`GraphStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Member id.
	pub id: MemberId,
	/// Label drawn next to the node.
	pub label: String,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Radius in graph units.
	pub size: f64,
	/// Fill color.
	pub color: ColorToken,
}

impl GraphNode {
	/// Current graph-space position.
	pub fn position(&self) -> Point {
		(self.x, self.y)
	}
}

/// How newly seen nodes are positioned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
	/// Uniform scatter in `[-extent, extent]²`.
	Scatter {
		/// Half-width of the square.
		extent: f64,
	},
	/// Even ring, ordered as the incoming nodes are.
	Circle {
		/// Ring radius in graph units.
		radius: f64,
	},
}

/// Hovered node and its direct neighbours.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Node under the pointer, if any.
	pub node: Option<MemberId>,
	/// Members sharing an edge with `node`.
	pub neighbors: HashSet<MemberId>,
}

/// The engine-owned positioned graph. Every mutation goes through `sync`,
/// `set_node_position`, `set_hover` or `clear`.
pub struct GraphStore {
	nodes: IndexMap<MemberId, GraphNode>,
	edges: Vec<RenderEdge>,
	hover: HoverState,
	rng: SmallRng,
}

impl GraphStore {
	/// Empty store whose scatter placement is seeded with `seed`.
	pub fn new(seed: u64) -> Self {
		Self {
			nodes: IndexMap::new(),
			edges: Vec::new(),
			hover: HoverState::default(),
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
		self.nodes.values()
	}

	/// Looks a node up by id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.get(id)
	}

	/// Whether a node with this id exists.
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Edges from the last sync, minus those with a missing endpoint.
	pub fn edges(&self) -> &[RenderEdge] {
		&self.edges
	}

	/// Current hover highlight.
	pub fn hover(&self) -> &HoverState {
		&self.hover
	}

	/// Reconciles the store with a new snapshot.
	///
	/// Existing nodes keep their position and only take the new label, size
	/// and color. New nodes are placed with their hint or `placement`. Edges
	/// are rebuilt from scratch.
	pub fn sync(&mut self, incoming: &[NodeSpec], edges: &[RenderEdge], placement: Placement) {
		let keep: HashSet<&str> = incoming.iter().map(|n| n.id.as_str()).collect();
		let before = self.nodes.len();
		self.nodes.retain(|id, _| keep.contains(id.as_str()));
		let removed = before - self.nodes.len();

		let total = incoming.len();
		let mut added = 0;
		for (i, spec) in incoming.iter().enumerate() {
			if let Some(node) = self.nodes.get_mut(&spec.id) {
				node.label.clone_from(&spec.label);
				node.size = spec.size;
				node.color = spec.color;
				continue;
			}
			let (x, y) = match spec.hint {
				Some(hint) => hint,
				None => self.place(placement, i, total),
			};
			self.nodes.insert(
				spec.id.clone(),
				GraphNode {
					id: spec.id.clone(),
					label: spec.label.clone(),
					x,
					y,
					size: spec.size,
					color: spec.color,
				},
			);
			added += 1;
		}

		self.edges.clear();
		for edge in edges {
			self.add_edge(edge.clone());
		}

		if self
			.hover
			.node
			.as_deref()
			.is_some_and(|id| !self.nodes.contains_key(id))
		{
			self.set_hover(None);
		} else {
			let hovered = self.hover.node.clone();
			self.hover.node = None;
			self.set_hover(hovered);
		}

		debug!(
			"graph sync: {} nodes (+{added} -{removed}), {} edges",
			self.nodes.len(),
			self.edges.len()
		);
	}

	fn place(&mut self, placement: Placement, index: usize, total: usize) -> Point {
		match placement {
			Placement::Scatter { extent } => {
				let extent = extent.abs();
				(
					self.rng.gen_range(-extent..=extent),
					self.rng.gen_range(-extent..=extent),
				)
			}
			Placement::Circle { radius } => {
				let angle = index as f64 * 2.0 * PI / total.max(1) as f64;
				(radius * angle.cos(), radius * angle.sin())
			}
		}
	}

	fn add_edge(&mut self, edge: RenderEdge) {
		if !self.nodes.contains_key(&edge.from) || !self.nodes.contains_key(&edge.to) {
			warn!("cannot add edge {} -> {}: endpoint not in graph", edge.from, edge.to);
			return;
		}
		self.edges.push(edge);
	}

	/// Moves a node. Returns false if the node does not exist.
	pub fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.x = x;
				node.y = y;
				true
			}
			None => false,
		}
	}

	/// Drops every node and edge, as on a filter rebuild.
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.hover = HoverState::default();
	}

	/// Topmost node under a screen position, with a pick radius that scales
	/// with zoom like the nodes themselves.
	pub fn node_at_position(
		&self,
		transform: &ViewTransform,
		sx: f64,
		sy: f64,
		min_hit_radius: f64,
	) -> Option<&GraphNode> {
		let (gx, gy) = transform.screen_to_graph(sx, sy);
		self.nodes.values().rev().find(|node| {
			let (dx, dy) = (node.x - gx, node.y - gy);
			(dx * dx + dy * dy).sqrt() < node.size.max(min_hit_radius)
		})
	}

	/// Highlights `node` and its neighbours, or clears the highlight.
	pub fn set_hover(&mut self, node: Option<MemberId>) {
		if self.hover.node == node {
			return;
		}
		self.hover.neighbors.clear();
		if let Some(id) = &node {
			for edge in &self.edges {
				if &edge.from == id {
					self.hover.neighbors.insert(edge.to.clone());
				} else if &edge.to == id {
					self.hover.neighbors.insert(edge.from.clone());
				}
			}
		}
		self.hover.node = node;
	}

	/// Whether `id` is hovered or next to the hovered node.
	pub fn is_highlighted(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.neighbors.contains(id)
	}

	/// Whether anything is hovered.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some()
	}

}
