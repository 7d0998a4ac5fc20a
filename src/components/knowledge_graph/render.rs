use std::f64::consts::PI;
use std::ops::RangeInclusive;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{EdgeCurve, LabelBox, NodeGlyph, Scene, Shape};
use super::state::GraphViewState;
use super::style::{self, rgba};
use super::types::Point;
use super::viewport::Viewport;

const GRID_STEP: f64 = 40.0;
const TOOLTIP_CHAR_W: f64 = 7.0;

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(style::BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let vp = state.viewport;
	let _ = ctx.translate(vp.pan.x, vp.pan.y);
	let _ = ctx.scale(vp.zoom, vp.zoom);

	draw_backdrop(state, ctx);
	let scene = state.scene();
	draw_edges(&scene, vp.zoom, ctx);
	draw_nodes(&scene, vp.zoom, ctx);
	ctx.restore();

	draw_tooltip(&scene, vp, ctx);
}

fn draw_backdrop(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (state.cfg.canvas_width, state.cfg.canvas_height);
	let (x0, y0) = (
		state.cfg.canvas_center.x - w / 2.0,
		state.cfg.canvas_center.y - h / 2.0,
	);
	ctx.set_fill_style_str(style::CANVAS_BACKDROP);
	ctx.fill_rect(x0, y0, w, h);

	// Dots are skipped when zoomed far out; they'd just be noise.
	let vp = state.viewport;
	if vp.zoom < 0.5 {
		return;
	}
	let top_left = vp.to_graph_coords(Point::new(0.0, 0.0));
	let bottom_right = vp.to_graph_coords(Point::new(state.width, state.height));
	let cols = grid_indices(x0, w, top_left.x, bottom_right.x);
	let rows = grid_indices(y0, h, top_left.y, bottom_right.y);

	ctx.begin_path();
	for i in cols {
		for j in rows.clone() {
			ctx.rect(x0 + i as f64 * GRID_STEP - 1.0, y0 + j as f64 * GRID_STEP - 1.0, 2.0, 2.0);
		}
	}
	ctx.set_fill_style_str(style::GRID_DOT);
	ctx.fill();
}

/// Grid lines `origin + i * GRID_STEP` inside both `[lo, hi]` and the
/// backdrop's `extent`.
fn grid_indices(origin: f64, extent: f64, lo: f64, hi: f64) -> RangeInclusive<usize> {
	let from = ((lo - origin) / GRID_STEP).ceil().max(0.0);
	let to = ((hi - origin) / GRID_STEP).floor().min((extent / GRID_STEP).floor());
	if to < from {
		return 1..=0;
	}
	from as usize..=to as usize
}

fn draw_edges(scene: &Scene, k: f64, ctx: &CanvasRenderingContext2d) {
	for edge in &scene.edges {
		let color = if edge.hovered { style::EDGE_HOVER_RGB } else { style::EDGE_RGB };
		ctx.set_stroke_style_str(&rgba(color, edge.alpha));
		ctx.set_line_width(edge.width);
		if edge.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0),
				&JsValue::from_f64(4.0),
			));
		}

		ctx.begin_path();
		ctx.move_to(edge.start.x, edge.start.y);
		ctx.quadratic_curve_to(edge.control.x, edge.control.y, edge.end.x, edge.end.y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		draw_arrow(edge, color, ctx);
	}

	for label in scene.edges.iter().filter_map(|e| e.label.as_ref()) {
		draw_label_box(label, k, ctx);
	}
}

fn draw_arrow(edge: &EdgeCurve, color: (u8, u8, u8), ctx: &CanvasRenderingContext2d) {
	let [tip, left, right] = edge.arrow;
	ctx.set_fill_style_str(&rgba(color, edge.alpha));
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(left.x, left.y);
	ctx.line_to(right.x, right.y);
	ctx.close_path();
	ctx.fill();
}

fn draw_label_box(label: &LabelBox, k: f64, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (label.center.x - label.width / 2.0, label.center.y - label.height / 2.0);
	rounded_rect_path(ctx, x, y, label.width, label.height, 4.0);
	ctx.set_fill_style_str(style::LABEL_BOX_FILL);
	ctx.fill();
	ctx.set_stroke_style_str(style::LABEL_BOX_STROKE);
	ctx.set_line_width(1.0 / k);
	ctx.stroke();

	ctx.set_fill_style_str(style::LABEL_TEXT);
	ctx.set_font("11px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&label.text, label.center.x, label.center.y);
}

fn draw_nodes(scene: &Scene, k: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for glyph in &scene.nodes {
		ctx.set_global_alpha(glyph.alpha);
		if glyph.hovered {
			draw_glow(glyph, ctx);
		}

		shape_path(glyph, ctx);
		ctx.set_fill_style_str(glyph.fill);
		ctx.fill();
		ctx.set_stroke_style_str(if glyph.selected { "#ffffff" } else { glyph.stroke });
		ctx.set_line_width(glyph.stroke_width / k.max(0.5));
		ctx.stroke();

		ctx.set_fill_style_str("#ffffff");
		ctx.set_font("18px sans-serif");
		let _ = ctx.fill_text(glyph.icon, glyph.center.x, glyph.center.y);

		ctx.set_fill_style_str(style::LABEL_TEXT);
		ctx.set_font("12px sans-serif");
		let _ = ctx.fill_text(
			&glyph.label,
			glyph.center.x,
			glyph.center.y + glyph.shape.label_offset(),
		);
	}
	ctx.set_global_alpha(1.0);
}

/// Full name of a hovered node whose label was cut short, in screen space.
fn draw_tooltip(scene: &Scene, vp: Viewport, ctx: &CanvasRenderingContext2d) {
	let Some((glyph, title)) = scene
		.nodes
		.iter()
		.find(|g| g.hovered)
		.and_then(|g| g.title.as_ref().map(|t| (g, t)))
	else {
		return;
	};
	let below = Point::new(glyph.center.x, glyph.center.y + glyph.shape.label_offset());
	let anchor = vp.to_screen_coords(below);
	let width = title.chars().count() as f64 * TOOLTIP_CHAR_W + 16.0;
	let (x, y) = (anchor.x - width / 2.0, anchor.y + 10.0);

	rounded_rect_path(ctx, x, y, width, 22.0, 4.0);
	ctx.set_fill_style_str(style::LABEL_BOX_FILL);
	ctx.fill();
	ctx.set_stroke_style_str(style::LABEL_BOX_STROKE);
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_fill_style_str(style::LABEL_TEXT);
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(title, anchor.x, y + 11.0);
}

fn draw_glow(glyph: &NodeGlyph, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (glyph.center.x, glyph.center.y);
	let inner = glyph.shape.boundary(1.0, 0.0).min(glyph.shape.boundary(0.0, 1.0));
	let outer = inner * 2.2;
	let Ok(gradient) = ctx.create_radial_gradient(x, y, inner * 0.5, x, y, outer) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, "rgba(125, 211, 252, 0.35)");
	let _ = gradient.add_color_stop(1.0, "rgba(125, 211, 252, 0)");
	ctx.begin_path();
	let _ = ctx.arc(x, y, outer, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn shape_path(glyph: &NodeGlyph, ctx: &CanvasRenderingContext2d) {
	let c = glyph.center;
	match glyph.shape {
		Shape::Circle { radius } => {
			ctx.begin_path();
			let _ = ctx.arc(c.x, c.y, radius, 0.0, 2.0 * PI);
		}
		Shape::RoundedRect { width, height, corner } => {
			rounded_rect_path(ctx, c.x - width / 2.0, c.y - height / 2.0, width, height, corner);
		}
	}
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}
