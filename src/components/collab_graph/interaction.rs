//! Pointer handling: node dragging, camera panning and click-to-evaluate.

use log::debug;

use super::camera::Camera;
use super::state::GraphStore;
use super::types::{MemberId, Point};

#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
	Idle,
	/// A node is held. `moved` flips once the pointer has travelled past the
	/// drag threshold; from then on the release is a drop, not a click.
	Dragging {
		node: MemberId,
		origin: Point,
		moved: bool,
	},
}

/// What the view should do after a pointer event.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerOutcome {
	/// Nothing changed.
	None,
	/// The store or camera changed.
	Redraw,
	/// A node was clicked without being dragged.
	Evaluate(MemberId),
}

pub struct InteractionController {
	state: Interaction,
	drag_threshold: f64,
	min_hit_radius: f64,
}

impl InteractionController {
	pub fn new(drag_threshold: f64, min_hit_radius: f64) -> Self {
		Self {
			state: Interaction::Idle,
			drag_threshold,
			min_hit_radius,
		}
	}

	pub fn state(&self) -> &Interaction {
		&self.state
	}

	pub fn dragged_node(&self) -> Option<&str> {
		match &self.state {
			Interaction::Dragging { node, .. } => Some(node),
			Interaction::Idle => None,
		}
	}

	pub fn pointer_down(
		&mut self,
		store: &mut GraphStore,
		camera: &mut Camera,
		sx: f64,
		sy: f64,
	) -> PointerOutcome {
		if !matches!(self.state, Interaction::Idle) {
			return PointerOutcome::None;
		}
		let hit = store
			.node_at_position(&camera.transform(), sx, sy, self.min_hit_radius)
			.map(|n| n.id.clone());
		match hit {
			Some(node) => {
				debug!("drag start on {node}");
				camera.disable();
				self.state = Interaction::Dragging {
					node,
					origin: (sx, sy),
					moved: false,
				};
			}
			None => camera.begin_pan(sx, sy),
		}
		PointerOutcome::None
	}

	pub fn pointer_move(
		&mut self,
		store: &mut GraphStore,
		camera: &mut Camera,
		sx: f64,
		sy: f64,
	) -> PointerOutcome {
		let threshold = self.drag_threshold;
		match &mut self.state {
			Interaction::Dragging { node, origin, moved } => {
				if !*moved {
					let (dx, dy) = (sx - origin.0, sy - origin.1);
					*moved = (dx * dx + dy * dy).sqrt() > threshold;
				}
				if !*moved {
					return PointerOutcome::None;
				}
				let (gx, gy) = camera.transform().screen_to_graph(sx, sy);
				if store.set_node_position(node, gx, gy) {
					return PointerOutcome::Redraw;
				}
				self.cancel(camera);
				PointerOutcome::Redraw
			}
			Interaction::Idle => {
				if camera.pan_to(sx, sy) {
					return PointerOutcome::Redraw;
				}
				let hovered = store
					.node_at_position(&camera.transform(), sx, sy, self.min_hit_radius)
					.map(|n| n.id.clone());
				if store.hover().node != hovered {
					store.set_hover(hovered);
					return PointerOutcome::Redraw;
				}
				PointerOutcome::None
			}
		}
	}

	pub fn pointer_up(&mut self, store: &GraphStore, camera: &mut Camera) -> PointerOutcome {
		camera.end_pan();
		let state = std::mem::replace(&mut self.state, Interaction::Idle);
		let Interaction::Dragging { node, moved, .. } = state else {
			return PointerOutcome::None;
		};
		camera.enable();
		if moved {
			debug!("drag end on {node}");
			PointerOutcome::Redraw
		} else if store.contains(&node) {
			PointerOutcome::Evaluate(node)
		} else {
			PointerOutcome::None
		}
	}

	/// Pointer left the surface: end any gesture without a click.
	pub fn pointer_leave(&mut self, store: &mut GraphStore, camera: &mut Camera) -> PointerOutcome {
		camera.end_pan();
		self.cancel(camera);
		store.set_hover(None);
		PointerOutcome::Redraw
	}

	pub fn wheel(&mut self, camera: &mut Camera, sx: f64, sy: f64, delta_y: f64) -> PointerOutcome {
		if matches!(self.state, Interaction::Dragging { .. }) {
			return PointerOutcome::None;
		}
		if camera.wheel_zoom(sx, sy, delta_y) {
			PointerOutcome::Redraw
		} else {
			PointerOutcome::None
		}
	}

	/// Called after every store sync: a drag survives unless its node is gone.
	pub fn reconcile(&mut self, store: &GraphStore, camera: &mut Camera) {
		if self.dragged_node().is_some_and(|id| !store.contains(id)) {
			debug!("dragged node removed by sync");
			self.cancel(camera);
		}
	}

	fn cancel(&mut self, camera: &mut Camera) {
		if matches!(self.state, Interaction::Dragging { .. }) {
			camera.enable();
		}
		self.state = Interaction::Idle;
	}
}
