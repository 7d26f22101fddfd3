//! Raster export of the current view: the graph layers over a grid
//! background, an optional corner watermark and a legend strip.

use chrono::{DateTime, Local};
use js_sys::{Function, Promise};
use log::{info, warn};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	Blob, CanvasRenderingContext2d, Document, Element, HtmlAnchorElement, HtmlCanvasElement,
	HtmlImageElement, Url,
};

use super::render::{BACKGROUND, CanvasSurface, paint_background};
use super::scene::{LABEL_COLOR, Primitive, Scene, Surface, TextAlign};
use super::score::{ColorToken, SCORE_BANDS};

const WATERMARK_MARGIN: f64 = 24.0;
const WATERMARK_ALPHA: f64 = 0.6;
/// Largest watermark width as a share of the graph width.
const WATERMARK_MAX_SHARE: f64 = 0.2;

const LEGEND_PADDING: f64 = 16.0;
const LEGEND_TITLE_HEIGHT: f64 = 24.0;
const LEGEND_ROW_HEIGHT: f64 = 24.0;
const LEGEND_COLUMN_WIDTH: f64 = 170.0;
const LEGEND_SWATCH: f64 = 14.0;

/// Keeps the object URL alive long enough for the browser to start the download.
const REVOKE_DELAY_MS: i32 = 40_000;

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("no browser window or document")]
	NoDocument,
	#[error("could not create off-screen canvas: {0}")]
	Canvas(String),
	#[error("2d canvas context unavailable")]
	ContextUnavailable,
	#[error("png encoding failed: {0}")]
	Encode(String),
	#[error("download failed: {0}")]
	Download(String),
}

fn js_err(value: JsValue) -> String {
	value
		.as_string()
		.unwrap_or_else(|| format!("{value:?}"))
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	pub color: ColorToken,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendModel {
	pub title: String,
	pub entries: Vec<LegendEntry>,
}

impl LegendModel {
	pub fn score_bands() -> Self {
		Self {
			title: "Collaboration score".into(),
			entries: SCORE_BANDS
				.iter()
				.map(|band| LegendEntry {
					color: band.color,
					label: format!("{} - {}", band.score, band.name),
				})
				.collect(),
		}
	}

	fn columns(&self, width: f64) -> usize {
		(((width - 2.0 * LEGEND_PADDING) / LEGEND_COLUMN_WIDTH).floor() as usize).max(1)
	}

	/// Height of the strip when laid out across `width`.
	pub fn height(&self, width: f64) -> f64 {
		let rows = self.entries.len().div_ceil(self.columns(width));
		2.0 * LEGEND_PADDING + LEGEND_TITLE_HEIGHT + rows as f64 * LEGEND_ROW_HEIGHT
	}

	fn paint<S: Surface>(&self, surface: &mut S, top: f64, width: f64) {
		surface.draw(&Primitive::Rect {
			origin: (0.0, top),
			size: (width, self.height(width)),
			color: BACKGROUND.into(),
		});
		surface.draw(&Primitive::Line {
			from: (0.0, top),
			to: (width, top),
			color: LABEL_COLOR.into(),
			width: 2.0,
		});
		surface.draw(&Primitive::Text {
			at: (LEGEND_PADDING, top + LEGEND_PADDING + 14.0),
			text: self.title.clone(),
			size: 14.0,
			color: LABEL_COLOR.into(),
			align: TextAlign::Left,
			bold: true,
		});

		let columns = self.columns(width);
		let rows_top = top + LEGEND_PADDING + LEGEND_TITLE_HEIGHT;
		for (i, entry) in self.entries.iter().enumerate() {
			let x = LEGEND_PADDING + (i % columns) as f64 * LEGEND_COLUMN_WIDTH;
			let y = rows_top + (i / columns) as f64 * LEGEND_ROW_HEIGHT;
			surface.draw(&Primitive::Rect {
				origin: (x, y),
				size: (LEGEND_SWATCH, LEGEND_SWATCH),
				color: entry.color.into(),
			});
			surface.draw(&Primitive::Text {
				at: (x + LEGEND_SWATCH + 8.0, y + LEGEND_SWATCH - 2.0),
				text: entry.label.clone(),
				size: 12.0,
				color: LABEL_COLOR.into(),
				align: TextAlign::Left,
				bold: false,
			});
		}
	}
}

/// Geometry of the exported image in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportLayout {
	pub width: f64,
	pub height: f64,
	pub pixel_ratio: f64,
	pub legend_height: f64,
}

impl ExportLayout {
	pub fn new(width: f64, height: f64, pixel_ratio: f64, legend: Option<&LegendModel>) -> Self {
		Self {
			width,
			height,
			pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
			legend_height: legend.map_or(0.0, |l| l.height(width)),
		}
	}

	pub fn total_height(&self) -> f64 {
		self.height + self.legend_height
	}

	/// Backing-store size in device pixels.
	pub fn canvas_size(&self) -> (u32, u32) {
		(
			(self.width * self.pixel_ratio).ceil() as u32,
			(self.total_height() * self.pixel_ratio).ceil() as u32,
		)
	}
}

/// Paints a full export onto `surface`, in CSS pixels.
pub fn compose<S: Surface>(
	surface: &mut S,
	scene: &Scene,
	layout: &ExportLayout,
	grid_spacing: f64,
	legend: Option<&LegendModel>,
	watermark: Option<&S::Image>,
) {
	paint_background(surface, (0.0, 0.0), (layout.width, layout.height), grid_spacing);
	scene.paint(surface);

	if let Some(image) = watermark {
		match surface.image_size(image) {
			Some((w, h)) => {
				let scale = (layout.width * WATERMARK_MAX_SHARE / w).min(1.0);
				let size = (w * scale, h * scale);
				let origin = (
					layout.width - size.0 - WATERMARK_MARGIN,
					layout.height - size.1 - WATERMARK_MARGIN,
				);
				surface.draw_image(image, origin, size, WATERMARK_ALPHA);
			}
			None => warn!("watermark not usable, exporting without it"),
		}
	}

	if let Some(legend) = legend {
		legend.paint(surface, layout.height, layout.width);
	}
}

pub fn export_file_name(now: DateTime<Local>) -> String {
	format!("sociogram-{}.png", now.format("%Y%m%d-%H%M%S"))
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
	pub pixel_ratio: f64,
	pub grid_spacing: f64,
	pub legend: Option<LegendModel>,
	pub watermark_url: Option<String>,
}

/// Detached container for the export's DOM nodes, removed on drop.
struct Offscreen {
	root: Element,
}

impl Offscreen {
	fn new(document: &Document, width: f64, height: f64) -> Result<Self, ExportError> {
		let root = document
			.create_element("div")
			.map_err(|e| ExportError::Canvas(js_err(e)))?;
		let _ = root.set_attribute(
			"style",
			&format!("position:absolute;right:101%;bottom:101%;width:{width}px;height:{height}px;"),
		);
		let body = document.body().ok_or(ExportError::NoDocument)?;
		body.append_child(&root)
			.map_err(|e| ExportError::Canvas(js_err(e)))?;
		Ok(Self { root })
	}
}

impl Drop for Offscreen {
	fn drop(&mut self) {
		self.root.remove();
	}
}

async fn load_image(url: &str) -> Option<HtmlImageElement> {
	let image = HtmlImageElement::new().ok()?;
	image.set_cross_origin(Some("anonymous"));
	image.set_src(url);
	match JsFuture::from(image.decode()).await {
		Ok(_) => Some(image),
		Err(e) => {
			warn!("could not load watermark {url}: {}", js_err(e));
			None
		}
	}
}

async fn encode_png(canvas: &HtmlCanvasElement) -> Result<Blob, ExportError> {
	let mut failed = None;
	let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
		let callback = Closure::once_into_js(move |blob: JsValue| {
			let _ = resolve.call1(&JsValue::NULL, &blob);
		});
		if let Err(e) = canvas.to_blob(callback.unchecked_ref()) {
			failed = Some(e);
		}
	});
	if let Some(e) = failed {
		return Err(ExportError::Encode(js_err(e)));
	}
	JsFuture::from(promise)
		.await
		.map_err(|e| ExportError::Encode(js_err(e)))?
		.dyn_into::<Blob>()
		.map_err(|_| ExportError::Encode("canvas produced no image".into()))
}

fn download(document: &Document, parent: &Element, blob: &Blob, file_name: &str) -> Result<(), ExportError> {
	let url = Url::create_object_url_with_blob(blob).map_err(|e| ExportError::Download(js_err(e)))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(|e| ExportError::Download(js_err(e)))?
		.unchecked_into();
	anchor.set_href(&url);
	anchor.set_download(file_name);
	parent
		.append_child(&anchor)
		.map_err(|e| ExportError::Download(js_err(e)))?;
	anchor.click();

	let revoke = Closure::once_into_js(move || {
		let _ = Url::revoke_object_url(&url);
	});
	if let Some(window) = web_sys::window() {
		let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
			revoke.unchecked_ref(),
			REVOKE_DELAY_MS,
		);
	}
	Ok(())
}

/// Renders `scene` off-screen, encodes it and hands it to the browser as a
/// download. Returns the file name used. Off-screen elements are removed
/// whether or not the export succeeds.
pub async fn export_png(scene: Scene, options: ExportOptions) -> Result<String, ExportError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(ExportError::NoDocument)?;

	let layout = ExportLayout::new(
		scene.width,
		scene.height,
		options.pixel_ratio,
		options.legend.as_ref(),
	);
	let offscreen = Offscreen::new(&document, layout.width, layout.total_height())?;

	let canvas: HtmlCanvasElement = document
		.create_element("canvas")
		.map_err(|e| ExportError::Canvas(js_err(e)))?
		.dyn_into()
		.map_err(|_| ExportError::Canvas("not a canvas element".into()))?;
	let (w, h) = layout.canvas_size();
	canvas.set_width(w);
	canvas.set_height(h);
	offscreen
		.root
		.append_child(&canvas)
		.map_err(|e| ExportError::Canvas(js_err(e)))?;

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|c| c.dyn_into().ok())
		.ok_or(ExportError::ContextUnavailable)?;
	let _ = ctx.scale(layout.pixel_ratio, layout.pixel_ratio);

	let watermark = match options.watermark_url.as_deref() {
		Some(url) => load_image(url).await,
		None => None,
	};

	compose(
		&mut CanvasSurface::new(&ctx),
		&scene,
		&layout,
		options.grid_spacing,
		options.legend.as_ref(),
		watermark.as_ref(),
	);

	let blob = encode_png(&canvas).await?;
	let file_name = export_file_name(Local::now());
	download(&document, &offscreen.root, &blob, &file_name)?;
	info!("exported {file_name} ({w}x{h})");
	Ok(file_name)
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::components::collab_graph::camera::ViewTransform;
	use crate::components::collab_graph::scene::tests::{Recorder, two_member_store};

	fn scene() -> Scene {
		let t = ViewTransform { x: 400.0, y: 300.0, k: 1.0 };
		Scene::build(&two_member_store(true), &t, 800.0, 600.0)
	}

	#[test]
	fn background_then_graph_then_legend() {
		let scene = scene();
		let legend = LegendModel::score_bands();
		let layout = ExportLayout::new(800.0, 600.0, 2.0, Some(&legend));
		let mut out = Recorder::default();
		compose(&mut out, &scene, &layout, 20.0, Some(&legend), None);

		assert_eq!(
			out.ops[0],
			Primitive::Rect {
				origin: (0.0, 0.0),
				size: (800.0, 600.0),
				color: BACKGROUND.into(),
			}
		);
		assert!(matches!(out.ops[1], Primitive::Grid { spacing: 20.0, .. }));

		let mut only_scene = Recorder::default();
		scene.paint(&mut only_scene);
		let graph_ops = only_scene.ops.len();
		assert_eq!(&out.ops[2..2 + graph_ops], only_scene.ops.as_slice());

		let legend_texts: Vec<_> = out.ops[2 + graph_ops..]
			.iter()
			.filter_map(|p| match p {
				Primitive::Text { text, .. } => Some(text.as_str()),
				_ => None,
			})
			.collect();
		assert_eq!(
			legend_texts,
			vec!["Collaboration score", "0 - None", "1 - Low", "2 - Moderate", "3 - Good", "4 - Optimal"]
		);
	}

	#[test]
	fn layout_accounts_for_legend_and_pixel_ratio() {
		let legend = LegendModel::score_bands();
		// 800px fits four columns, so five entries wrap onto two rows
		assert_eq!(legend.height(800.0), 2.0 * 16.0 + 24.0 + 2.0 * 24.0);

		let layout = ExportLayout::new(800.0, 600.0, 2.0, Some(&legend));
		assert_eq!(layout.canvas_size(), (1600, 2 * (600 + 104)));

		let bare = ExportLayout::new(800.0, 600.0, 0.0, None);
		assert_eq!(bare.canvas_size(), (800, 600));
	}

	#[test]
	fn watermark_is_anchored_bottom_right() {
		let layout = ExportLayout::new(800.0, 600.0, 1.0, None);
		let mut out = Recorder::default();
		compose(&mut out, &scene(), &layout, 20.0, None, Some(&Some((400.0, 100.0))));

		// scaled to a fifth of the width
		assert_eq!(out.images, vec![((616.0, 536.0), (160.0, 40.0), 0.6)]);
	}

	#[test]
	fn broken_watermark_still_exports() {
		let layout = ExportLayout::new(800.0, 600.0, 1.0, None);
		let mut with_broken = Recorder::default();
		compose(&mut with_broken, &scene(), &layout, 20.0, None, Some(&None));
		let mut without = Recorder::default();
		compose(&mut without, &scene(), &layout, 20.0, None, None);

		assert!(with_broken.images.is_empty());
		assert_eq!(with_broken.ops, without.ops);
	}

	#[test]
	fn file_names_are_timestamped() {
		let at = Local.with_ymd_and_hms(2024, 5, 17, 9, 3, 7).unwrap();
		assert_eq!(export_file_name(at), "sociogram-20240517-090307.png");
	}
}
