use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::scene::{Primitive, Scene, Surface, TextAlign};
use super::types::Point;

pub const BACKGROUND: &str = "#ffffff";
pub const GRID_COLOR: &str = "rgba(0, 0, 0, 0.05)";

/// White fill plus the background grid, covering `size` from `origin`.
pub fn paint_background<S: Surface>(surface: &mut S, origin: Point, size: (f64, f64), spacing: f64) {
	surface.draw(&Primitive::Rect {
		origin,
		size,
		color: BACKGROUND.into(),
	});
	if spacing > 0.0 {
		surface.draw(&Primitive::Grid {
			origin,
			size,
			spacing,
			color: GRID_COLOR.into(),
		});
	}
}

/// Paints the live view.
pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d, grid_spacing: f64) {
	let mut surface = CanvasSurface::new(ctx);
	paint_background(&mut surface, (0.0, 0.0), (scene.width, scene.height), grid_spacing);
	scene.paint(&mut surface);
}

pub struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl Surface for CanvasSurface<'_> {
	type Image = HtmlImageElement;

	fn draw(&mut self, primitive: &Primitive) {
		let ctx = self.ctx;
		match primitive {
			Primitive::Rect { origin, size, color } => {
				ctx.set_fill_style_str(color);
				ctx.fill_rect(origin.0, origin.1, size.0, size.1);
			}
			Primitive::Grid {
				origin,
				size,
				spacing,
				color,
			} => {
				ctx.set_stroke_style_str(color);
				ctx.set_line_width(1.0);
				ctx.begin_path();
				let mut x = origin.0;
				while x <= origin.0 + size.0 {
					ctx.move_to(x, origin.1);
					ctx.line_to(x, origin.1 + size.1);
					x += spacing;
				}
				let mut y = origin.1;
				while y <= origin.1 + size.1 {
					ctx.move_to(origin.0, y);
					ctx.line_to(origin.0 + size.0, y);
					y += spacing;
				}
				ctx.stroke();
			}
			Primitive::Line {
				from,
				to,
				color,
				width,
			} => {
				ctx.set_stroke_style_str(color);
				ctx.set_line_width(*width);
				ctx.begin_path();
				ctx.move_to(from.0, from.1);
				ctx.line_to(to.0, to.1);
				ctx.stroke();
			}
			Primitive::Curve {
				from,
				control,
				to,
				color,
				width,
			} => {
				ctx.set_stroke_style_str(color);
				ctx.set_line_width(*width);
				ctx.begin_path();
				ctx.move_to(from.0, from.1);
				ctx.quadratic_curve_to(control.0, control.1, to.0, to.1);
				ctx.stroke();
			}
			Primitive::Polygon { points, color } => {
				let Some((first, rest)) = points.split_first() else {
					return;
				};
				ctx.set_fill_style_str(color);
				ctx.begin_path();
				ctx.move_to(first.0, first.1);
				for p in rest {
					ctx.line_to(p.0, p.1);
				}
				ctx.close_path();
				ctx.fill();
			}
			Primitive::Circle {
				center,
				radius,
				fill,
				stroke,
			} => {
				ctx.begin_path();
				let _ = ctx.arc(center.0, center.1, *radius, 0.0, 2.0 * PI);
				if let Some(fill) = fill {
					ctx.set_fill_style_str(fill);
					ctx.fill();
				}
				if let Some((color, width)) = stroke {
					ctx.set_stroke_style_str(color);
					ctx.set_line_width(*width);
					ctx.stroke();
				}
			}
			Primitive::Text {
				at,
				text,
				size,
				color,
				align,
				bold,
			} => {
				let weight = if *bold { "bold " } else { "" };
				ctx.set_font(&format!("{weight}{size}px monospace"));
				ctx.set_text_align(match align {
					TextAlign::Left => "left",
					TextAlign::Center => "center",
				});
				ctx.set_fill_style_str(color);
				let _ = ctx.fill_text(text, at.0, at.1);
			}
		}
	}

	fn image_size(&self, image: &HtmlImageElement) -> Option<(f64, f64)> {
		let (w, h) = (image.natural_width(), image.natural_height());
		(image.complete() && w > 0 && h > 0).then(|| (w as f64, h as f64))
	}

	fn draw_image(&mut self, image: &HtmlImageElement, origin: Point, size: (f64, f64), alpha: f64) {
		self.ctx.set_global_alpha(alpha);
		let _ = self
			.ctx
			.draw_image_with_html_image_element_and_dw_and_dh(image, origin.0, origin.1, size.0, size.1);
		self.ctx.set_global_alpha(1.0);
	}
}
