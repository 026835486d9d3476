use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MessageEvent, MouseEvent, Window,
};

use super::interaction::{apply_values, drag_end, drag_move, drag_start};
use super::message::{InboundMessage, OriginPolicy};
use super::render;
use super::simulation::ForceParameters;
use super::snapshot;
use super::state::{LayoutStrategy, TopicGraphState};
use super::types::{Graph, Point, Viewport};

/// Space trimmed from the hosting frame's size.
const FRAME_MARGIN: f64 = 20.0;

type SharedState = Rc<RefCell<Option<TopicGraphState>>>;

/// Size of the frame hosting this page, falling back to the canvas parent.
fn measure_viewport(window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
	if let Some(frame) = window
		.frame_element()
		.ok()
		.flatten()
		.and_then(|el| el.dyn_into::<HtmlElement>().ok())
	{
		return (
			frame.offset_width() as f64 - FRAME_MARGIN,
			frame.offset_height() as f64 - FRAME_MARGIN,
		);
	}
	canvas
		.parent_element()
		.map(|p| {
			(
				p.client_width() as f64 - FRAME_MARGIN,
				p.client_height() as f64 - FRAME_MARGIN,
			)
		})
		.unwrap_or((800.0, 600.0))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn on_window_message(state: &SharedState, policy: &OriginPolicy, ev: MessageEvent) {
	let own_origin = web_sys::window()
		.and_then(|w| w.location().origin().ok())
		.unwrap_or_default();
	let origin = ev.origin();
	if !policy.accepts(&origin, &own_origin) {
		log::warn!("rejected message from origin `{origin}`");
		return;
	}

	let data = ev.data();
	let update = match serde_wasm_bindgen::from_value::<InboundMessage>(data.clone()) {
		Ok(msg) => msg.into_update(),
		Err(err) => {
			let raw = js_sys::JSON::stringify(&data)
				.map(String::from)
				.unwrap_or_default();
			log::debug!("ignored message {raw}: {err}");
			return;
		}
	};

	if let Some(ref mut s) = *state.borrow_mut() {
		let changed = apply_values(s, &update);
		log::debug!(
			"value update: {} entries, {} labels changed",
			update.len(),
			changed.len()
		);
	}
}

#[component]
pub fn TopicGraphCanvas(
	#[prop(into)] data: Signal<Graph>,
	#[prop(default = LayoutStrategy::Force)] strategy: LayoutStrategy,
	#[prop(default = OriginPolicy::SameOrigin)] origin_policy: OriginPolicy,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let export_ref = NodeRef::<leptos::html::A>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let message_cb: Rc<RefCell<Option<Closure<dyn FnMut(MessageEvent)>>>> =
		Rc::new(RefCell::new(None));
	let (state_init, animate_init, message_cb_init) =
		(state.clone(), animate.clone(), message_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		// Listener and frame closures are installed once per mount.
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			log::error!("no window available");
			return;
		};

		let (mw, mh) = measure_viewport(&window, &canvas);
		let viewport = Viewport::new(width.unwrap_or(mw), height.unwrap_or(mh));
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(TopicGraphState::new(
			data.get_untracked(),
			viewport,
			strategy,
			ForceParameters::default(),
		));

		let (state_msg, policy) = (state_init.clone(), origin_policy.clone());
		*message_cb_init.borrow_mut() = Some(Closure::new(move |ev: MessageEvent| {
			on_window_message(&state_msg, &policy, ev);
		}));
		if let Some(ref cb) = *message_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("message", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.is_animating() || s.drag.active() {
					s.tick();
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			drag_start(s, p);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			drag_move(s, p);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			drag_end(s);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			drag_end(s);
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			s.relayout();
			log::debug!("relayout requested");
		}
	};

	let state_ex = state.clone();
	let on_export = move |_: MouseEvent| {
		let Some(anchor) = export_ref.get() else {
			return;
		};
		let guard = state_ex.borrow();
		let Some(s) = guard.as_ref() else {
			return;
		};
		let doc = snapshot::render_document(s).to_string();
		let encoded: String = js_sys::encode_uri_component(&doc).into();
		anchor.set_href(&format!("data:image/svg+xml;charset=utf-8,{encoded}"));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="topic-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
		<a
			node_ref=export_ref
			class="graph-export"
			href="#"
			download="graph.svg"
			on:click=on_export
		>
			"Export SVG"
		</a>
	}
}
