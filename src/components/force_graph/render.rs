use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, Hovered, LABEL_OFFSET, NODE_RADIUS};
use crate::graph::{RenderFrame, SessionPhase, VertexKind, VisibleEdge, VisibleVertex};

const BACKGROUND: &str = "#1a1a2e";
const TOOLTIP_LINE: f64 = 16.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn kind_color(kind: VertexKind) -> &'static str {
	match kind {
		VertexKind::File => "#4fc3f7",
		VertexKind::FileVersion => "#81d4fa",
		VertexKind::FileLocation => "#b3e5fc",
		VertexKind::Bucket => "#ffb74d",
		VertexKind::Project => "#ff8a65",
		VertexKind::Context => "#aed581",
		VertexKind::Execution => "#dce775",
		VertexKind::Unknown => "#9e9e9e",
	}
}

/// Draws one frame in screen space.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let session = &state.session;
	match session.phase() {
		SessionPhase::LoadingVertices => draw_status(state, ctx, "Loading vertices..."),
		SessionPhase::LoadingEdges => draw_status(state, ctx, "Loading edges..."),
		SessionPhase::Failed => {
			let message = session
				.error()
				.map(|err| format!("Could not load the graph: {err}"))
				.unwrap_or_else(|| "Could not load the graph".to_string());
			draw_status(state, ctx, &message);
		}
		SessionPhase::Ready => {
			let frame = session.frame();
			draw_edges(state, &frame, ctx);
			draw_vertices(state, &frame, ctx);
			draw_tooltip(state, ctx);
		}
		SessionPhase::Disposed => {}
	}
}

fn draw_status(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, text: &str) {
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	let _ = ctx.fill_text(text, state.width / 2.0, state.height / 2.0);
	ctx.set_text_align("start");
}

fn is_edge_hovered(state: &ForceGraphState, edge: &VisibleEdge) -> bool {
	matches!(&state.hover.target, Some(Hovered::Edge(id)) if *id == edge.id)
}

fn draw_edges(state: &ForceGraphState, frame: &RenderFrame, ctx: &CanvasRenderingContext2d) {
	let k = frame.transform.k;
	let radius = NODE_RADIUS * k;
	let (line_width, dash, gap, arrow_size) = (1.5, 8.0, 4.0, 8.0 * k.sqrt());
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let model = state.session.model();

	for edge in &frame.edges {
		let (x1, y1, x2, y2) = (edge.source.x, edge.source.y, edge.target.x, edge.target.y);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < radius * 2.0 {
			continue;
		}

		let endpoints_lit = model
			.edge(&edge.id)
			.and_then(|e| Some((model.resolve(e.source_id())?, model.resolve(e.target_id())?)))
			.is_some_and(|(s, d)| state.is_highlighted(s) && state.is_highlighted(d));
		let highlighted = endpoints_lit || is_edge_hovered(state, edge);

		let (edge_alpha, arrow_alpha, width) = if highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * radius, y1 + uy * radius);
		ctx.line_to(x2 - ux * (radius + arrow_size), y2 - uy * (radius + arrow_size));
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba(100, 180, 255, {})", arrow_alpha));
		let (tip_x, tip_y) = (x2 - ux * radius, y2 - uy * radius);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if highlighted && t > 0.5 {
			ctx.set_fill_style_str("rgba(200, 220, 255, 0.8)");
			ctx.set_font("10px sans-serif");
			let _ = ctx.fill_text(&edge.display_name, (x1 + x2) / 2.0 + 4.0, (y1 + y2) / 2.0 - 4.0);
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_vertex(
	ctx: &CanvasRenderingContext2d,
	vertex: &VisibleVertex,
	radius: f64,
	label_offset: f64,
	label_alpha: f64,
) {
	let (x, y) = (vertex.screen.x, vertex.screen.y);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(kind_color(vertex.kind));
	ctx.fill();

	// Collapsed hosts get a second ring.
	if vertex.aggregated {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius * 1.35, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(kind_color(vertex.kind));
		ctx.set_line_width(2.0);
		ctx.stroke();
	} else if vertex.collapsible {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.5)");
		ctx.set_line_width(1.0);
		ctx.stroke();
	}

	ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", label_alpha));
	ctx.set_font("11px sans-serif");
	let _ = ctx.fill_text(&vertex.display_name, x + label_offset, y + 4.0);
}

fn draw_vertices(state: &ForceGraphState, frame: &RenderFrame, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		frame.transform.k,
	);
	let label_offset = LABEL_OFFSET * k.sqrt();

	for vertex in &frame.vertices {
		if has_highlight && state.is_highlighted(&vertex.id) {
			continue;
		}
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * k * (1.0 - 0.15 * t));
		ctx.set_global_alpha(alpha);
		draw_vertex(ctx, vertex, radius, label_offset, 0.8);
		ctx.set_global_alpha(1.0);
	}

	if !has_highlight {
		return;
	}

	for vertex in &frame.vertices {
		if !state.is_highlighted(&vertex.id) {
			continue;
		}
		let hovered = matches!(&state.hover.target, Some(Hovered::Vertex(id)) if *id == vertex.id);
		let radius = if hovered {
			NODE_RADIUS * k * (1.0 + 0.35 * t)
		} else {
			NODE_RADIUS * k * (1.0 + 0.2 * t)
		};
		draw_vertex(ctx, vertex, radius, label_offset, 1.0);

		if hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(vertex.screen.x, vertex.screen.y, radius + 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5);
			ctx.stroke();
		}
	}
}

fn draw_tooltip(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let Some(rows) = state.tooltip() else {
		return;
	};
	if rows.is_empty() || state.hover.highlight_t < 0.5 {
		return;
	}
	let lines: Vec<String> = rows
		.iter()
		.map(|(key, value)| format!("{key}: {value}"))
		.collect();
	let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
	let (box_w, box_h) = (longest as f64 * 6.5 + 16.0, lines.len() as f64 * TOOLTIP_LINE + 10.0);
	let x = (state.hover.x + 14.0).min(state.width - box_w).max(0.0);
	let y = (state.hover.y + 14.0).min(state.height - box_h).max(0.0);

	ctx.set_fill_style_str("rgba(20, 20, 40, 0.92)");
	ctx.fill_rect(x, y, box_w, box_h);
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.6)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(x, y, box_w, box_h);

	ctx.set_fill_style_str("white");
	ctx.set_font("11px monospace");
	for (row, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + 8.0, y + 18.0 + row as f64 * TOOLTIP_LINE);
	}
}
