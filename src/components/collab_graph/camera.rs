use super::config::GraphConfig;
use super::types::Point;

/// Graph-to-screen mapping: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> Point {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

fn ease_in_out_quad(t: f64) -> f64 {
	if t < 0.5 {
		2.0 * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
	}
}

#[derive(Clone, Debug)]
struct Tween {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
}

#[derive(Clone, Debug, Default)]
struct PanState {
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

pub struct Camera {
	transform: ViewTransform,
	home: ViewTransform,
	width: f64,
	height: f64,
	enabled: bool,
	animation: Option<Tween>,
	pan: Option<PanState>,
	duration: f64,
	zoom_ratio: f64,
	min_zoom: f64,
	max_zoom: f64,
}

impl Camera {
	pub fn new(width: f64, height: f64, config: &GraphConfig) -> Self {
		let home = ViewTransform {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		};
		Self {
			transform: home,
			home,
			width,
			height,
			enabled: true,
			animation: None,
			pan: None,
			duration: config.animation_secs,
			zoom_ratio: config.zoom_ratio,
			min_zoom: config.min_zoom,
			max_zoom: config.max_zoom,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Jumps straight to `transform`, dropping any animation in flight.
	pub fn set_transform(&mut self, transform: ViewTransform) {
		self.animation = None;
		self.transform = ViewTransform {
			k: transform.k.clamp(self.min_zoom, self.max_zoom),
			..transform
		};
	}

	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.home.x = width / 2.0;
		self.home.y = height / 2.0;
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn enable(&mut self) {
		self.enabled = true;
	}

	pub fn disable(&mut self) {
		self.enabled = false;
		self.pan = None;
	}

	pub fn is_animating(&self) -> bool {
		self.animation.is_some()
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	pub fn zoom_in(&mut self) -> bool {
		self.zoom_by(self.zoom_ratio)
	}

	pub fn zoom_out(&mut self) -> bool {
		self.zoom_by(1.0 / self.zoom_ratio)
	}

	/// Animates back to the viewport-centred, unscaled view.
	pub fn center(&mut self) -> bool {
		self.animate_to(self.home)
	}

	fn zoom_by(&mut self, factor: f64) -> bool {
		let current = self.transform;
		let k = (current.k * factor).clamp(self.min_zoom, self.max_zoom);
		let ratio = k / current.k;
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		self.animate_to(ViewTransform {
			x: cx - (cx - current.x) * ratio,
			y: cy - (cy - current.y) * ratio,
			k,
		})
	}

	fn animate_to(&mut self, to: ViewTransform) -> bool {
		if !self.enabled {
			return false;
		}
		self.pan = None;
		self.animation = Some(Tween {
			from: self.transform,
			to,
			elapsed: 0.0,
		});
		true
	}

	/// Advances the running animation by `dt` seconds. Returns whether one is
	/// still in flight.
	pub fn tick(&mut self, dt: f64) -> bool {
		let Some(tween) = self.animation.as_mut() else {
			return false;
		};
		tween.elapsed += dt;
		let t = if self.duration > 0.0 {
			(tween.elapsed / self.duration).min(1.0)
		} else {
			1.0
		};
		self.transform = tween.from.lerp(&tween.to, ease_in_out_quad(t));
		if t >= 1.0 {
			self.transform = tween.to;
			self.animation = None;
		}
		self.animation.is_some()
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		if !self.enabled {
			return;
		}
		self.animation = None;
		self.pan = Some(PanState {
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		});
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		let Some(pan) = &self.pan else {
			return false;
		};
		self.transform.x = pan.transform_start_x + (sx - pan.start_x);
		self.transform.y = pan.transform_start_y + (sy - pan.start_y);
		true
	}

	pub fn end_pan(&mut self) {
		self.pan = None;
	}

	/// Wheel zoom anchored on the pointer.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64) -> bool {
		if !self.enabled {
			return false;
		}
		self.animation = None;
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(self.min_zoom, self.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn camera() -> Camera {
		Camera::new(800.0, 600.0, &GraphConfig::default())
	}

	fn settle(camera: &mut Camera) {
		while camera.tick(0.016) {}
	}

	#[test]
	fn screen_graph_mapping_round_trips() {
		let t = ViewTransform { x: 40.0, y: -10.0, k: 2.0 };
		let (gx, gy) = t.screen_to_graph(140.0, 90.0);
		assert_eq!((gx, gy), (50.0, 50.0));
		assert_eq!(t.graph_to_screen(gx, gy), (140.0, 90.0));
	}

	#[test]
	fn zoom_animates_instead_of_jumping() {
		let mut cam = camera();
		assert!(cam.zoom_in());
		assert_eq!(cam.transform().k, 1.0);
		assert!(cam.tick(0.3));
		let mid = cam.transform().k;
		assert!(mid > 1.0 && mid < 1.5);
		settle(&mut cam);
		assert!((cam.transform().k - 1.5).abs() < 1e-9);
		// zooming about the viewport centre keeps it fixed
		assert!((cam.transform().x - 400.0).abs() < 1e-9);
	}

	#[test]
	fn new_animation_overrides_the_running_one() {
		let mut cam = camera();
		cam.zoom_in();
		cam.tick(0.3);
		cam.center();
		settle(&mut cam);
		assert_eq!(cam.transform(), ViewTransform { x: 400.0, y: 300.0, k: 1.0 });
	}

	#[test]
	fn center_is_idempotent() {
		let mut cam = camera();
		cam.set_transform(ViewTransform { x: 10.0, y: 10.0, k: 3.0 });
		cam.center();
		settle(&mut cam);
		let once = cam.transform();
		cam.center();
		settle(&mut cam);
		assert_eq!(cam.transform(), once);
	}

	#[test]
	fn disabled_camera_ignores_requests() {
		let mut cam = camera();
		cam.disable();
		assert!(!cam.zoom_out());
		assert!(!cam.center());
		assert!(!cam.wheel_zoom(10.0, 10.0, -1.0));
		cam.begin_pan(0.0, 0.0);
		assert!(!cam.pan_to(50.0, 50.0));
		assert!(!cam.is_animating());
	}

	#[test]
	fn zoom_is_clamped() {
		let mut cam = camera();
		for _ in 0..20 {
			cam.zoom_in();
			settle(&mut cam);
		}
		assert_eq!(cam.transform().k, 10.0);
	}

	#[test]
	fn pan_follows_pointer() {
		let mut cam = camera();
		cam.begin_pan(100.0, 100.0);
		assert!(cam.pan_to(130.0, 90.0));
		assert_eq!((cam.transform().x, cam.transform().y), (430.0, 290.0));
		cam.end_pan();
		assert!(!cam.pan_to(0.0, 0.0));
	}
}
