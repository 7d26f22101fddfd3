use log::info;

use super::camera::Camera;
use super::config::GraphConfig;
use super::export::{ExportOptions, LegendModel};
use super::filter::FilterQuery;
use super::interaction::{InteractionController, PointerOutcome};
use super::pipeline::prepare;
use super::scene::Scene;
use super::state::{GraphStore, Placement};
use super::types::TeamData;

/// Everything one mounted graph owns: the store, its camera and the pointer
/// state machine. Lives for as long as the canvas is mounted.
pub struct GraphView {
	store: GraphStore,
	camera: Camera,
	interaction: InteractionController,
	config: GraphConfig,
	query: Option<FilterQuery>,
}

impl GraphView {
	/// Empty view for a `width` by `height` viewport.
	pub fn new(width: f64, height: f64, config: GraphConfig) -> Self {
		Self {
			store: GraphStore::new(config.seed),
			camera: Camera::new(width, height, &config),
			interaction: InteractionController::new(config.drag_threshold, config.min_hit_radius),
			config,
			query: None,
		}
	}

	/// The positioned graph.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// The camera.
	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	/// The pointer state machine.
	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	/// Brings the store in line with a dataset snapshot. A changed filter
	/// rebuilds the graph on a ring; anything else is an in-place refresh.
	pub fn apply(&mut self, data: &TeamData, query: &FilterQuery, base_size: f64) {
		let query = query.normalized();
		let prepared = prepare(data, &query, self.config.sizing.policy(), base_size);
		let placement = match &self.query {
			Some(previous) if *previous != query => {
				info!("filter changed, rebuilding graph");
				self.store.clear();
				Placement::Circle {
					radius: self.config.circle_radius,
				}
			}
			_ => Placement::Scatter {
				extent: self.config.scatter_extent,
			},
		};
		self.store.sync(&prepared.nodes, &prepared.edges, placement);
		self.interaction.reconcile(&self.store, &mut self.camera);
		self.query = Some(query);
	}

	/// Pointer pressed at a screen position.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> PointerOutcome {
		self.interaction
			.pointer_down(&mut self.store, &mut self.camera, sx, sy)
	}

	/// Pointer moved to a screen position.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> PointerOutcome {
		self.interaction
			.pointer_move(&mut self.store, &mut self.camera, sx, sy)
	}

	/// Pointer released. Yields `Evaluate` for a click on a node.
	pub fn pointer_up(&mut self) -> PointerOutcome {
		self.interaction.pointer_up(&self.store, &mut self.camera)
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) -> PointerOutcome {
		self.interaction
			.pointer_leave(&mut self.store, &mut self.camera)
	}

	/// Wheel zoom anchored at a screen position.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> PointerOutcome {
		self.interaction.wheel(&mut self.camera, sx, sy, delta_y)
	}

	/// Animated zoom in. False while a drag holds the camera.
	pub fn zoom_in(&mut self) -> bool {
		self.camera.zoom_in()
	}

	/// Animated zoom out. False while a drag holds the camera.
	pub fn zoom_out(&mut self) -> bool {
		self.camera.zoom_out()
	}

	/// Animated return to the home view. False while a drag holds the camera.
	pub fn center(&mut self) -> bool {
		self.camera.center()
	}

	/// Advances camera animation by `dt` seconds. True while one is running.
	pub fn tick(&mut self, dt: f64) -> bool {
		self.camera.tick(dt)
	}

	/// New viewport size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
	}

	/// Screen-space primitives for the current state.
	pub fn scene(&self) -> Scene {
		let (width, height) = self.camera.viewport();
		Scene::build(&self.store, &self.camera.transform(), width, height)
	}

	/// Background grid spacing.
	pub fn grid_spacing(&self) -> f64 {
		self.config.grid_spacing
	}

	/// Export settings for a device with the given pixel ratio.
	pub fn export_options(&self, pixel_ratio: f64) -> ExportOptions {
		ExportOptions {
			pixel_ratio,
			grid_spacing: self.config.grid_spacing,
			legend: self.config.legend.then(LegendModel::score_bands),
			watermark_url: self.config.watermark_url.clone(),
		}
	}
}
