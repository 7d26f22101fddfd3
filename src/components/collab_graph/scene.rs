//! Screen-space draw list shared by the live canvas and image export.

use super::camera::ViewTransform;
use super::edges::RenderEdge;
use super::state::GraphStore;
use super::types::Point;

pub const EDGE_WIDTH: f64 = 2.0;
pub const ARROW_SIZE: f64 = 8.0;
pub const LABEL_SIZE: f64 = 14.0;
pub const EDGE_LABEL_SIZE: f64 = 12.0;
pub const LABEL_COLOR: &str = "#000000";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
	Left,
	Center,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
	Rect {
		origin: Point,
		size: (f64, f64),
		color: String,
	},
	/// Evenly spaced horizontal and vertical rules covering a rectangle.
	Grid {
		origin: Point,
		size: (f64, f64),
		spacing: f64,
		color: String,
	},
	Line {
		from: Point,
		to: Point,
		color: String,
		width: f64,
	},
	Curve {
		from: Point,
		control: Point,
		to: Point,
		color: String,
		width: f64,
	},
	Polygon {
		points: Vec<Point>,
		color: String,
	},
	Circle {
		center: Point,
		radius: f64,
		fill: Option<String>,
		stroke: Option<(String, f64)>,
	},
	Text {
		at: Point,
		text: String,
		size: f64,
		color: String,
		align: TextAlign,
		bold: bool,
	},
}

/// A drawing backend.
pub trait Surface {
	type Image;

	fn draw(&mut self, primitive: &Primitive);

	/// Natural size of a loaded image, `None` if it is unusable.
	fn image_size(&self, image: &Self::Image) -> Option<(f64, f64)>;

	fn draw_image(&mut self, image: &Self::Image, origin: Point, size: (f64, f64), alpha: f64);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
	Edges,
	Nodes,
	EdgeLabels,
	Labels,
	Hovers,
}

/// Bottom to top.
pub const LAYER_ORDER: [LayerKind; 5] = [
	LayerKind::Edges,
	LayerKind::Nodes,
	LayerKind::EdgeLabels,
	LayerKind::Labels,
	LayerKind::Hovers,
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	layers: [Vec<Primitive>; 5],
}

fn unit(from: Point, to: Point) -> Option<Point> {
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let len = (dx * dx + dy * dy).sqrt();
	(len >= 0.001).then(|| (dx / len, dy / len))
}

fn arrowhead(tip: Point, dir: Point) -> Vec<Point> {
	let back = (tip.0 - dir.0 * ARROW_SIZE, tip.1 - dir.1 * ARROW_SIZE);
	let (px, py) = (-dir.1 * ARROW_SIZE * 0.5, dir.0 * ARROW_SIZE * 0.5);
	vec![tip, (back.0 + px, back.1 + py), (back.0 - px, back.1 - py)]
}

impl Scene {
	pub fn build(store: &GraphStore, transform: &ViewTransform, width: f64, height: f64) -> Self {
		let mut scene = Scene {
			width,
			height,
			..Default::default()
		};
		let k = transform.k;

		for edge in store.edges() {
			let (Some(a), Some(b)) = (store.node(&edge.from), store.node(&edge.to)) else {
				continue;
			};
			let from = transform.graph_to_screen(a.x, a.y);
			let to = transform.graph_to_screen(b.x, b.y);
			scene.push_edge(edge, from, a.size * k, to, b.size * k);
		}

		for node in store.nodes() {
			let center = transform.graph_to_screen(node.x, node.y);
			let radius = node.size * k;
			scene.push(
				LayerKind::Nodes,
				Primitive::Circle {
					center,
					radius,
					fill: Some(node.color.to_string()),
					stroke: None,
				},
			);
			let highlighted = store.is_highlighted(&node.id);
			scene.push(
				if highlighted { LayerKind::Hovers } else { LayerKind::Labels },
				Primitive::Text {
					at: (center.0 + radius + 3.0, center.1 + LABEL_SIZE * 0.35),
					text: node.label.clone(),
					size: LABEL_SIZE,
					color: LABEL_COLOR.into(),
					align: TextAlign::Left,
					bold: true,
				},
			);
			if highlighted {
				let hovered = store.hover().node.as_deref() == Some(node.id.as_str());
				let (alpha, ring) = if hovered { (0.7, 4.0) } else { (0.35, 2.5) };
				scene.push(
					LayerKind::Hovers,
					Primitive::Circle {
						center,
						radius: radius + ring,
						fill: None,
						stroke: Some((format!("rgba(0, 0, 0, {alpha})"), 2.0)),
					},
				);
			}
		}

		scene
	}

	fn push(&mut self, kind: LayerKind, primitive: Primitive) {
		self.layers[kind as usize].push(primitive);
	}

	fn push_edge(&mut self, edge: &RenderEdge, from: Point, r_from: f64, to: Point, r_to: f64) {
		let color = edge.color.to_string();
		let label_at = if edge.is_curved() {
			let control = edge.control_point(from, to);
			let (Some(out), Some(inward)) = (unit(from, control), unit(control, to)) else {
				return;
			};
			let start = (from.0 + out.0 * r_from, from.1 + out.1 * r_from);
			let tip = (to.0 - inward.0 * r_to, to.1 - inward.1 * r_to);
			let end = (tip.0 - inward.0 * ARROW_SIZE, tip.1 - inward.1 * ARROW_SIZE);
			self.push(
				LayerKind::Edges,
				Primitive::Curve {
					from: start,
					control,
					to: end,
					color: color.clone(),
					width: EDGE_WIDTH,
				},
			);
			self.push(
				LayerKind::Edges,
				Primitive::Polygon {
					points: arrowhead(tip, inward),
					color: color.clone(),
				},
			);
			(
				0.25 * from.0 + 0.5 * control.0 + 0.25 * to.0,
				0.25 * from.1 + 0.5 * control.1 + 0.25 * to.1,
			)
		} else {
			let Some(dir) = unit(from, to) else {
				return;
			};
			let start = (from.0 + dir.0 * r_from, from.1 + dir.1 * r_from);
			let tip = (to.0 - dir.0 * r_to, to.1 - dir.1 * r_to);
			let end = (tip.0 - dir.0 * ARROW_SIZE, tip.1 - dir.1 * ARROW_SIZE);
			self.push(
				LayerKind::Edges,
				Primitive::Line {
					from: start,
					to: end,
					color: color.clone(),
					width: EDGE_WIDTH,
				},
			);
			self.push(
				LayerKind::Edges,
				Primitive::Polygon {
					points: arrowhead(tip, dir),
					color: color.clone(),
				},
			);
			((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0)
		};

		self.push(
			LayerKind::EdgeLabels,
			Primitive::Text {
				at: label_at,
				text: edge.label.clone(),
				size: EDGE_LABEL_SIZE,
				color,
				align: TextAlign::Center,
				bold: true,
			},
		);
	}

	pub fn layer(&self, kind: LayerKind) -> &[Primitive] {
		&self.layers[kind as usize]
	}

	pub fn layers(&self) -> impl Iterator<Item = (LayerKind, &[Primitive])> {
		LAYER_ORDER.into_iter().map(|kind| (kind, self.layer(kind)))
	}

	pub fn paint<S: Surface>(&self, surface: &mut S) {
		for (_, primitives) in self.layers() {
			for primitive in primitives {
				surface.draw(primitive);
			}
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::collab_graph::edges::resolve;
	use crate::components::collab_graph::state::{NodeSpec, Placement};
	use crate::components::collab_graph::types::{Direction, Relationship};

	/// Records everything drawn on it.
	#[derive(Default)]
	pub(crate) struct Recorder {
		pub ops: Vec<Primitive>,
		pub images: Vec<(Point, (f64, f64), f64)>,
	}

	impl Surface for Recorder {
		type Image = Option<(f64, f64)>;

		fn draw(&mut self, primitive: &Primitive) {
			self.ops.push(primitive.clone());
		}

		fn image_size(&self, image: &Self::Image) -> Option<(f64, f64)> {
			*image
		}

		fn draw_image(&mut self, _: &Self::Image, origin: Point, size: (f64, f64), alpha: f64) {
			self.images.push((origin, size, alpha));
		}
	}

	pub(crate) fn two_member_store(both_ways: bool) -> GraphStore {
		let mut store = GraphStore::new(0);
		let nodes: Vec<_> = [("a", (-100.0, 0.0)), ("b", (100.0, 0.0))]
			.into_iter()
			.map(|(id, hint)| NodeSpec {
				id: id.into(),
				label: id.to_uppercase(),
				size: 10.0,
				color: "#5FA8D3",
				hint: Some(hint),
			})
			.collect();
		let rel = |source: &str, target: &str, score| Relationship {
			source: source.into(),
			target: target.into(),
			score,
			direction: Direction::Outgoing,
			timestamp: String::new(),
		};
		let mut rels = vec![rel("a", "b", 2)];
		if both_ways {
			rels.push(rel("b", "a", 4));
		}
		store.sync(&nodes, &resolve(&rels), Placement::Scatter { extent: 1.0 });
		store
	}

	const HOME: ViewTransform = ViewTransform { x: 400.0, y: 300.0, k: 1.0 };

	#[test]
	fn straight_edge_stops_at_node_rims() {
		let scene = Scene::build(&two_member_store(false), &HOME, 800.0, 600.0);
		let edges = scene.layer(LayerKind::Edges);
		assert_eq!(edges.len(), 2);
		match &edges[0] {
			Primitive::Line { from, to, .. } => {
				assert_eq!(*from, (310.0, 300.0));
				assert_eq!(*to, (490.0 - ARROW_SIZE, 300.0));
			}
			other => panic!("expected a line, got {other:?}"),
		}
		match &edges[1] {
			Primitive::Polygon { points, color } => {
				assert_eq!(points[0], (490.0, 300.0));
				assert_eq!(color, "#5FA8D3");
			}
			other => panic!("expected an arrowhead, got {other:?}"),
		}
	}

	#[test]
	fn bidirectional_pair_draws_two_curves_on_opposite_sides() {
		let scene = Scene::build(&two_member_store(true), &HOME, 800.0, 600.0);
		let controls: Vec<Point> = scene
			.layer(LayerKind::Edges)
			.iter()
			.filter_map(|p| match p {
				Primitive::Curve { control, .. } => Some(*control),
				_ => None,
			})
			.collect();
		assert_eq!(controls.len(), 2);
		assert!((controls[0].1 - 300.0) * (controls[1].1 - 300.0) < 0.0);

		let labels: Vec<&str> = scene
			.layer(LayerKind::EdgeLabels)
			.iter()
			.filter_map(|p| match p {
				Primitive::Text { text, .. } => Some(text.as_str()),
				_ => None,
			})
			.collect();
		assert_eq!(labels, vec!["2", "4"]);
	}

	#[test]
	fn hover_moves_labels_to_overlay() {
		let mut store = two_member_store(false);
		store.set_hover(Some("a".into()));
		let scene = Scene::build(&store, &HOME, 800.0, 600.0);
		assert!(scene.layer(LayerKind::Labels).is_empty());
		assert_eq!(scene.layer(LayerKind::Hovers).len(), 4);
	}

	#[test]
	fn paint_follows_layer_order() {
		let scene = Scene::build(&two_member_store(false), &HOME, 800.0, 600.0);
		let mut recorder = Recorder::default();
		scene.paint(&mut recorder);
		let first_circle = recorder
			.ops
			.iter()
			.position(|p| matches!(p, Primitive::Circle { .. }))
			.unwrap();
		let last_edge = recorder
			.ops
			.iter()
			.rposition(|p| matches!(p, Primitive::Line { .. } | Primitive::Polygon { .. }))
			.unwrap();
		assert!(last_edge < first_circle);
		assert!(matches!(recorder.ops.last(), Some(Primitive::Text { .. })));
	}
}
