use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::config::{GraphConfig, LayoutMode};
use super::error::{GraphError, Result};
use super::render;
use super::source::GraphSource;
use super::state::GraphViewState;
use super::style::node_style;
use super::types::{GraphNode, NodeType, Point};

/// Reactive copies of what the panels show. The canvas reads the state
/// directly every frame; these only change after a transition.
#[derive(Clone, Copy)]
struct Panel {
	counts: RwSignal<(usize, usize)>,
	selected: RwSignal<Option<GraphNode>>,
	connections: RwSignal<Vec<String>>,
	types: RwSignal<Vec<NodeType>>,
	query: RwSignal<String>,
	zoom: RwSignal<f64>,
	loading: RwSignal<bool>,
	error: RwSignal<Option<String>>,
	layout: RwSignal<LayoutMode>,
	show_labels: RwSignal<bool>,
	cursor: RwSignal<&'static str>,
}

fn put<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
	if signal.with_untracked(|v| *v != value) {
		signal.set(value);
	}
}

impl Panel {
	fn new() -> Self {
		Self {
			counts: RwSignal::new((0, 0)),
			selected: RwSignal::new(None),
			connections: RwSignal::new(Vec::new()),
			types: RwSignal::new(NodeType::ALL.to_vec()),
			query: RwSignal::new(String::new()),
			zoom: RwSignal::new(1.0),
			loading: RwSignal::new(false),
			error: RwSignal::new(None),
			layout: RwSignal::new(LayoutMode::default()),
			show_labels: RwSignal::new(false),
			cursor: RwSignal::new("grab"),
		}
	}

	fn sync(&self, s: &GraphViewState) {
		put(self.counts, s.counts());
		put(self.selected, s.selected().cloned());
		put(self.connections, connections(s));
		put(
			self.types,
			NodeType::ALL
				.into_iter()
				.filter(|k| s.visibility.types.contains(k))
				.collect(),
		);
		put(self.query, s.visibility.query().to_owned());
		put(self.zoom, s.viewport.zoom);
		put(self.loading, s.is_loading());
		put(self.error, s.error().map(str::to_owned));
		put(self.layout, s.layout_mode());
		put(self.show_labels, s.show_labels);
		put(self.cursor, s.cursor());
	}
}

fn connections(s: &GraphViewState) -> Vec<String> {
	let Some(node) = s.selected() else {
		return Vec::new();
	};
	let data = s.data();
	data.edges
		.iter()
		.filter_map(|e| {
			let other = e.other_end(&node.id)?;
			let label = data.node(other).map_or(other, |n| n.label.as_str());
			Some(if e.source == node.id {
				format!("→ {}: {label}", e.relationship)
			} else {
				format!("← {}: {label}", e.relationship)
			})
		})
		.collect()
}

/// Shared handle given to every event handler.
#[derive(Clone)]
struct Handle {
	state: Rc<RefCell<GraphViewState>>,
	panel: Panel,
}

impl Handle {
	fn update(&self, f: impl FnOnce(&mut GraphViewState)) {
		let mut state = self.state.borrow_mut();
		f(&mut state);
		self.panel.sync(&state);
	}
}

fn load(h: &Handle, source: &GraphSource, root: Option<String>) {
	let mut ticket = 0;
	h.update(|s| ticket = s.begin_load());
	let (h, source) = (h.clone(), source.clone());
	spawn_local(async move {
		let result = source.get_graph(root.as_deref()).await;
		h.update(|s| {
			s.finish_load(ticket, result);
		});
	});
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.map_err(|e| GraphError::Canvas(format!("{e:?}")))?
		.ok_or_else(|| GraphError::Canvas("no 2d context".into()))?
		.dyn_into()
		.map_err(|_| GraphError::Canvas("unexpected context type".into()))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn local_point(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn KnowledgeGraph(
	/// Node the service should root the snapshot at.
	#[prop(optional, into)]
	root_id: Option<String>,
	#[prop(optional)] config: Option<GraphConfig>,
	#[prop(default = true)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let panel = Panel::new();
	let h = Handle {
		state: Rc::new(RefCell::new(GraphViewState::new(
			config.unwrap_or_default(),
			800.0,
			600.0,
		))),
		panel,
	};
	let source = GraphSource::from_env();
	info!("graph source: {source:?}");

	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let h_init = h.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let (width, height) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);
		h_init.state.borrow_mut().resize(width, height);

		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				error!("{e}");
				panel.error.set(Some(e.to_string()));
				return;
			}
		};

		if fullscreen {
			let (state_resize, canvas_resize) = (h_init.state.clone(), canvas.clone());
			*resize_cb.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.borrow_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (h_init.state.clone(), animate.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			if let Ok(mut s) = state_anim.try_borrow_mut() {
				s.tick(0.016);
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	load(&h, &source, root_id.clone());

	let h_md = h.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		if let Some(p) = local_point(canvas_ref, &ev) {
			h_md.update(|s| s.pointer_down(p));
		}
	};

	let h_mm = h.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(p) = local_point(canvas_ref, &ev) {
			h_mm.update(|s| s.pointer_move(p));
		}
	};

	let h_mu = h.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some(p) = local_point(canvas_ref, &ev) {
			h_mu.update(|s| s.pointer_up(p));
		}
	};

	let h_ml = h.clone();
	let on_mouseleave = move |_: MouseEvent| h_ml.update(|s| s.pointer_leave());

	let h_wh = h.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = local_point(canvas_ref, &ev) {
			h_wh.update(|s| s.wheel(ev.delta_y(), p));
		}
	};

	let h_kd = h.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		let mut handled = false;
		h_kd.update(|s| handled = s.key(&ev.key()));
		if handled {
			ev.prevent_default();
		}
	};

	let h_q = h.clone();
	let on_query = move |ev: Event| {
		let value = event_target_value(&ev);
		h_q.update(|s| s.set_query(&value));
	};
	let h_enter = h.clone();
	let on_query_key = move |ev: KeyboardEvent| {
		if ev.key() == "Enter" {
			h_enter.update(|s| {
				s.focus_search();
			});
		}
	};

	let button = |label: &'static str, f: fn(&mut GraphViewState)| {
		let h = h.clone();
		view! { <button class="kg-button" on:click=move |_| h.update(f)>{label}</button> }
	};

	let h_reload = h.clone();
	let on_reload = move |_| load(&h_reload, &source, root_id.clone());

	let legend = NodeType::ALL
		.into_iter()
		.map(|kind| {
			let h = h.clone();
			let style = node_style(kind);
			view! {
				<button
					class="kg-legend-item"
					class:off=move || !panel.types.get().contains(&kind)
					on:click=move |_| h.update(|s| s.toggle_type(kind))
				>
					<span class="kg-swatch" style=format!("background: {};", style.fill)>
						{style.icon}
					</span>
					{style.legend}
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="kg-root">
			<canvas
				node_ref=canvas_ref
				class="kg-canvas"
				tabindex="0"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:keydown=on_keydown
				style=move || format!("display: block; cursor: {};", panel.cursor.get())
			/>

			<div class="kg-toolbar">
				<input
					type="search"
					class="kg-search"
					placeholder="Search nodes…"
					prop:value=move || panel.query.get()
					on:input=on_query
					on:keydown=on_query_key
				/>
				{button("Edge labels", |s| s.show_labels = !s.show_labels)}
				{button("+1 hop", |s| s.expand_neighbors(1))}
				{button("+2 hops", |s| s.expand_neighbors(2))}
				{button("Show all", GraphViewState::reveal_all)}
				{button("Clear", GraphViewState::clear_visible)}
				{button("−", GraphViewState::zoom_out)}
				<span class="kg-zoom">{move || format!("{:.0}%", panel.zoom.get() * 100.0)}</span>
				{button("+", GraphViewState::zoom_in)}
				{button("Reset", GraphViewState::reset_view)}
				{button("Fit", GraphViewState::fit_view)}
				{button("Layout", |s| s.set_layout_mode(s.layout_mode().toggled()))}
				<button class="kg-button" on:click=on_reload>"Reload"</button>
				<span class="kg-counts">
					{move || {
						let (n, m) = panel.counts.get();
						format!("{n} nodes • {m} connections")
					}}
				</span>
				<span class="kg-mode">
					{move || match panel.layout.get() {
						LayoutMode::Grid => "grid",
						LayoutMode::Circular => "circular",
					}}
					{move || if panel.show_labels.get() { " · labels" } else { "" }}
				</span>
			</div>

			<div class="kg-legend">{legend}</div>

			<Show
				when=move || panel.selected.with(Option::is_some)
				fallback=|| {
					view! {
						<aside class="kg-details">
							<h2>"Getting started"</h2>
							<p>"Click a node to see its details and fan out its connections."</p>
							<p>"Search and press Enter to jump to a node. Use +1 hop to grow the view."</p>
							<p>"Arrow keys pan, + and - zoom, 0 resets, Esc clears the selection."</p>
						</aside>
					}
				}
			>
				<aside class="kg-details">
					{move || {
						panel
							.selected
							.get()
							.map(|node| {
								let style = node_style(node.kind);
								view! {
									<h2>{style.icon} " " {node.label.clone()}</h2>
									<p class="kg-kind">{style.legend} " · " {node.id.clone()}</p>
									<dl>
										{node
											.metadata
											.iter()
											.map(|(k, v)| view! { <dt>{k.clone()}</dt><dd>{v.to_string()}</dd> })
											.collect_view()}
									</dl>
								}
							})
					}}
					<ul class="kg-connections">
						{move || {
							panel
								.connections
								.get()
								.into_iter()
								.map(|c| view! { <li>{c}</li> })
								.collect_view()
						}}
					</ul>
				</aside>
			</Show>

			<Show when=move || panel.loading.get()>
				<div class="kg-overlay">"Loading knowledge graph…"</div>
			</Show>
			<Show when=move || panel.error.with(Option::is_some)>
				<div class="kg-overlay kg-error">{move || panel.error.get().unwrap_or_default()}</div>
			</Show>
		</div>
	}
}
