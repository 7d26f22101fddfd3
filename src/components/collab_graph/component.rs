use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::GraphConfig;
use super::export::export_png;
use super::filter::FilterQuery;
use super::interaction::PointerOutcome;
use super::render;
use super::types::TeamData;
use super::view::GraphView;

/// Toolbar-facing handle to a mounted graph. Created by the owning page,
/// filled in by [`CollabGraphCanvas`] on mount and emptied on unmount.
#[derive(Clone, Default)]
pub struct GraphHandle {
	view: Rc<RefCell<Option<GraphView>>>,
}

impl GraphHandle {
	/// Empty handle; every operation is a no-op until a canvas mounts.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether a canvas is attached.
	pub fn is_mounted(&self) -> bool {
		self.view.borrow().is_some()
	}

	fn attach(&self, view: GraphView) {
		*self.view.borrow_mut() = Some(view);
	}

	/// Releases the mounted view, leaving the handle inert.
	fn detach(&self) -> Option<GraphView> {
		self.view.borrow_mut().take()
	}

	fn with_view<R>(&self, f: impl FnOnce(&mut GraphView) -> R) -> Option<R> {
		self.view.borrow_mut().as_mut().map(f)
	}

	/// Zooms the mounted graph in.
	pub fn zoom_in(&self) -> bool {
		self.with_view(GraphView::zoom_in).unwrap_or(false)
	}

	/// Zooms the mounted graph out.
	pub fn zoom_out(&self) -> bool {
		self.with_view(GraphView::zoom_out).unwrap_or(false)
	}

	/// Animates the mounted graph back to its home view.
	pub fn center(&self) -> bool {
		self.with_view(GraphView::center).unwrap_or(false)
	}

	/// Starts a PNG export of the current view. Returns false if nothing is
	/// mounted.
	pub fn export_image(&self) -> bool {
		let pixel_ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
		let Some((scene, options)) =
			self.with_view(|view| (view.scene(), view.export_options(pixel_ratio)))
		else {
			warn!("export requested with no graph mounted");
			return false;
		};
		spawn_local(async move {
			match export_png(scene, options).await {
				Ok(file_name) => info!("export finished: {file_name}"),
				Err(e) => error!("export failed: {e}"),
			}
		});
		true
	}
}

/// Seconds between animation frames, from `requestAnimationFrame`
/// timestamps in milliseconds. The first frame advances nothing.
#[derive(Default)]
struct FrameClock {
	last: Option<f64>,
}

impl FrameClock {
	fn advance(&mut self, now: f64) -> f64 {
		let dt = self.last.map_or(0.0, |last| ((now - last) / 1000.0).max(0.0));
		self.last = Some(now);
		dt
	}
}

/// Browser callbacks owned by one mounted canvas.
#[derive(Default)]
struct Mount {
	frame: Option<Closure<dyn FnMut(f64)>>,
	frame_id: Option<i32>,
	resize: Option<Closure<dyn FnMut()>>,
}

impl Mount {
	fn request_frame(&mut self) {
		let (Some(frame), Some(window)) = (self.frame.as_ref(), web_sys::window()) else {
			return;
		};
		self.frame_id = window.request_animation_frame(frame.as_ref().unchecked_ref()).ok();
	}

	/// Cancels the pending frame and drops both callbacks. Must not run from
	/// inside the frame callback.
	fn teardown(&mut self) {
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame_id.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(resize) = &self.resize {
				let _ = window.remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());
			}
		}
		self.frame = None;
		self.resize = None;
	}
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

/// Interactive collaboration graph drawn on a canvas.
#[component]
pub fn CollabGraphCanvas(
	/// Team snapshot; every change re-syncs the graph in place.
	#[prop(into)]
	data: Signal<TeamData>,
	/// Name filter. A change rebuilds the graph on a ring.
	#[prop(into, default = Signal::stored(String::new()))]
	name_filter: Signal<String>,
	/// Department filter. A change rebuilds the graph on a ring.
	#[prop(into, default = Signal::stored(String::new()))]
	department_filter: Signal<String>,
	/// Base node radius.
	#[prop(into, default = Signal::stored(10.0))]
	node_size: Signal<f64>,
	/// Called with a member id when a node is clicked without being dragged.
	#[prop(into, optional)]
	on_evaluate: Option<Callback<String>>,
	/// Filled in on mount so a toolbar can drive the graph.
	#[prop(optional)]
	handle: GraphHandle,
	/// View tunables.
	#[prop(optional)]
	config: GraphConfig,
	/// Fixed canvas width; follows the parent when unset.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed canvas height; follows the parent when unset.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mount = StoredValue::new_local(Rc::new(RefCell::new(Mount::default())));
	let handle_init = handle.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if handle_init.is_mounted() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(mount) = mount.try_get_value() else {
			return;
		};

		let (w, h) = (
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			height.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("2d canvas context unavailable, graph not mounted");
			return;
		};

		let mut view = GraphView::new(w, h, config.clone());
		view.apply(
			&data.get_untracked(),
			&FilterQuery::new(name_filter.get_untracked(), department_filter.get_untracked()),
			node_size.get_untracked(),
		);
		handle_init.attach(view);
		info!("graph mounted at {w}x{h}");

		// fixed-size canvases ignore the window
		if width.is_none() || height.is_none() {
			let (handle_resize, canvas_resize) = (handle_init.clone(), canvas.clone());
			let resize = Closure::<dyn FnMut()>::new(move || {
				let Some(parent) = canvas_resize.parent_element() else {
					return;
				};
				let (nw, nh) = (
					width.unwrap_or(parent.client_width() as f64),
					height.unwrap_or(parent.client_height() as f64),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				handle_resize.with_view(|view| view.resize(nw, nh));
			});
			let _ = window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());
			mount.borrow_mut().resize = Some(resize);
		}

		let (handle_anim, mount_inner) = (handle_init.clone(), mount.clone());
		let mut clock = FrameClock::default();
		let frame = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
			let dt = clock.advance(now);
			if let Some(view) = handle_anim.view.borrow_mut().as_mut() {
				view.tick(dt);
				render::render(&view.scene(), &ctx, view.grid_spacing());
			}
			mount_inner.borrow_mut().request_frame();
		});
		let mut slot = mount.borrow_mut();
		slot.frame = Some(frame);
		slot.request_frame();
	});

	let handle_cleanup = StoredValue::new_local(handle.clone());
	on_cleanup(move || {
		if let Some(mount) = mount.try_get_value() {
			mount.borrow_mut().teardown();
		}
		if let Some(handle) = handle_cleanup.try_get_value() {
			if handle.detach().is_some() {
				info!("graph unmounted");
			}
		}
	});

	let handle_data = handle.clone();
	Effect::new(move |_| {
		let data = data.get();
		let query = FilterQuery::new(name_filter.get(), department_filter.get());
		let size = node_size.get();
		handle_data.with_view(|view| view.apply(&data, &query, size));
	});

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		handle_md.with_view(|view| view.pointer_down(x, y));
		if handle_md.with_view(|view| view.interaction().dragged_node().is_some()) == Some(true) {
			set_cursor(canvas_ref, "grabbing");
		}
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			handle_mm.with_view(|view| view.pointer_move(x, y));
		}
	};

	let handle_mu = handle.clone();
	let on_mouseup = move |_: MouseEvent| {
		let outcome = handle_mu.with_view(GraphView::pointer_up);
		set_cursor(canvas_ref, "grab");
		// the view borrow is released before handing control back to the page
		if let (Some(PointerOutcome::Evaluate(id)), Some(callback)) = (outcome, on_evaluate.as_ref()) {
			callback.run(id);
		}
	};

	let handle_ml = handle.clone();
	let on_mouseleave = move |_: MouseEvent| {
		handle_ml.with_view(GraphView::pointer_leave);
		set_cursor(canvas_ref, "grab");
	};

	let handle_wh = handle;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			handle_wh.with_view(|view| view.wheel(x, y, ev.delta_y()));
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="collab-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
