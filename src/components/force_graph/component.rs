use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use log::info;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::fetch;
use super::render;
use super::state::ForceGraphState;
use super::types::GraphSource;
use crate::graph::GraphConfig;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Streams vertices, then edges, into the session. Stops quietly once
/// `disposed` is raised.
async fn load_graph(source: GraphSource, state: SharedState, disposed: Arc<AtomicBool>) {
	for url in [source.vertex_url, source.edge_url] {
		let outcome = fetch::stream_body(&url, &disposed, |chunk| {
			if let Some(s) = state.borrow_mut().as_mut() {
				s.session.push_chunk(chunk);
			}
		})
		.await;
		let mut guard = state.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		match outcome {
			Ok(true) => s.session.finish_stream(),
			Ok(false) => return,
			Err(err) => {
				s.session.fail_stream(err);
				return;
			}
		}
	}
}

#[component]
pub fn ForceGraphCanvas(
	#[prop(optional)] source: GraphSource,
	#[prop(optional)] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let disposed = Arc::new(AtomicBool::new(false));
	let (state_init, animate_init, resize_cb_init, disposed_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		disposed.clone(),
	);

	let disposed_cleanup = disposed.clone();
	on_cleanup(move || disposed_cleanup.store(true, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
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
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			return;
		};
		*state_init.borrow_mut() = Some(ForceGraphState::new(config.clone(), w, h));
		spawn_local(load_graph(
			source.clone(),
			state_init.clone(),
			disposed_init.clone(),
		));

		if fullscreen {
			let (state_resize, canvas_resize, disposed_resize) =
				(state_init.clone(), canvas.clone(), disposed_init.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				if disposed_resize.load(Ordering::Relaxed) {
					return;
				}
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, resize_cb_anim, disposed_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			disposed_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			if disposed_anim.load(Ordering::Relaxed) {
				if let Some(mut s) = state_anim.borrow_mut().take() {
					s.session.dispose();
				}
				if let Some(ref cb) = *resize_cb_anim.borrow() {
					let _ = window
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				info!("graph canvas unmounted");
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_dc = state.clone();
	let navigate = use_navigate();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let url = state_dc
			.borrow()
			.as_ref()
			.and_then(|s| s.detail_url_at(x, y));
		if let Some(url) = url {
			navigate(&format!("/{url}"), Default::default());
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = pointer(mouse) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	let (state_collapse, state_expand) = (state.clone(), state.clone());
	let collapse_all = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_collapse.borrow_mut() {
			s.session.toggle_all(true);
		}
	};
	let expand_all = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_expand.borrow_mut() {
			s.session.toggle_all(false);
		}
	};

	view! {
		<div class="force-graph">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<button on:click=collapse_all>"Collapse all"</button>
				<button on:click=expand_all>"Expand all"</button>
			</div>
		</div>
	}
}
