use leptos::prelude::*;

use crate::components::collab_graph::{
	CollabGraphCanvas, Direction, GraphHandle, Member, Relationship, SCORE_BANDS, TeamData,
	departments,
};

/// Sample team (deterministic so reloads look the same).
fn generate_sample_data() -> TeamData {
	let people = [
		("1", "Alice Moreau", "Engineering Lead", "Engineering"),
		("2", "Bob Okafor", "Backend Engineer", "Engineering"),
		("3", "Carol Nguyen", "Frontend Engineer", "Engineering"),
		("4", "Dan Ibarra", "Product Manager", "Product"),
		("5", "Eve Lindqvist", "Designer", "Product"),
		("6", "Frank Adeyemi", "Account Manager", "Sales"),
		("7", "Grace Tanaka", "Sales Engineer", "Sales"),
		("8", "Heidi Novak", "Support Lead", "Support"),
	];
	let nodes = people
		.iter()
		.map(|(id, label, role, department)| Member {
			id: (*id).into(),
			label: (*label).into(),
			role: (*role).into(),
			department: (*department).into(),
			x: None,
			y: None,
		})
		.collect();

	// (source, target, score, day of month)
	let evaluations = [
		("1", "2", 4, 3),
		("2", "1", 3, 4),
		("1", "3", 3, 5),
		("3", "1", 4, 5),
		("2", "3", 2, 6),
		("4", "1", 3, 7),
		("4", "5", 4, 8),
		("5", "4", 4, 8),
		("5", "3", 1, 9),
		("6", "7", 3, 10),
		("7", "6", 2, 11),
		("7", "2", 1, 12),
		("8", "6", 0, 13),
		("8", "2", 2, 14),
		("6", "4", 3, 15),
		// newer re-evaluation of the same pair and direction
		("2", "1", 4, 20),
	];
	let edges = evaluations
		.iter()
		.map(|(source, target, score, day)| Relationship {
			source: (*source).into(),
			target: (*target).into(),
			score: *score,
			direction: Direction::Outgoing,
			timestamp: format!("2024-03-{day:02}T09:00:00Z"),
		})
		.collect();

	TeamData { nodes, edges }
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let data = generate_sample_data();
	let department_options = departments(&data.nodes);
	let graph_data = Signal::stored(data);

	let (name_filter, set_name_filter) = signal(String::new());
	let (department_filter, set_department_filter) = signal(String::new());
	let (node_size, set_node_size) = signal(10.0_f64);
	let (evaluating, set_evaluating) = signal(None::<String>);

	let handle = GraphHandle::new();
	let on_evaluate = Callback::new(move |id: String| {
		let label = graph_data
			.with_untracked(|d| d.member(&id).map(|m| m.label.clone()))
			.unwrap_or(id);
		set_evaluating.set(Some(label));
	});

	// `GraphHandle` is `!Send`; keep it in local storage so the view closure stays `Send`
	let handle = StoredValue::new_local(handle);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<div class="graph-toolbar">
					<input
						type="search"
						placeholder="Search by name"
						prop:value=name_filter
						on:input=move |ev| set_name_filter.set(event_target_value(&ev))
					/>
					<select on:change=move |ev| set_department_filter.set(event_target_value(&ev))>
						<option value="">"All departments"</option>
						{department_options
							.into_iter()
							.map(|d| view! { <option value=d.clone()>{d.clone()}</option> })
							.collect_view()}
					</select>
					<label>
						"Node size "
						<input
							type="range"
							min="5"
							max="20"
							step="1"
							prop:value=move || node_size.get().to_string()
							on:input=move |ev| {
								if let Ok(size) = event_target_value(&ev).parse::<f64>() {
									set_node_size.set(size);
								}
							}
						/>
					</label>
					<button on:click=move |_| handle.with_value(|h| { h.zoom_in(); })>"+"</button>
					<button on:click=move |_| handle.with_value(|h| { h.zoom_out(); })>"-"</button>
					<button on:click=move |_| handle.with_value(|h| { h.center(); })>"Center"</button>
					<button on:click=move |_| handle.with_value(|h| { h.export_image(); })>"Export PNG"</button>
				</div>

				<CollabGraphCanvas
					data=graph_data
					name_filter=name_filter
					department_filter=department_filter
					node_size=node_size
					on_evaluate=on_evaluate
					handle=handle.get_value()
				/>

				<div class="graph-overlay">
					<h1>"Team Collaboration"</h1>
					<p class="subtitle">
						"Click a member to evaluate them. Drag to reposition. Scroll to zoom."
					</p>
					<ul class="legend">
						{SCORE_BANDS
							.iter()
							.map(|band| {
								view! {
									<li>
										<span class="swatch" style=format!("background: {}", band.color)></span>
										{format!("{} - {}", band.score, band.name)}
									</li>
								}
							})
							.collect_view()}
					</ul>
					{move || {
						evaluating
							.get()
							.map(|label| view! { <p class="evaluating">"Evaluating: " {label}</p> })
					}}
				</div>
			</div>
		</ErrorBoundary>
	}
}
