use kurbo::Point;
use leptos::prelude::*;
use log::debug;

use crate::components::social_graph::{NodeId, Scene, SceneEdge, SceneNode, SocialGraphCanvas};

const COLORS: &[&str] = &[
	"#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
	"#9c755f", "#bab0ac",
];

#[derive(Clone, Debug, PartialEq)]
struct Person {
	id: String,
	first_name: String,
	last_name: String,
}

impl Person {
	fn new(id: impl Into<String>, first_name: &str, last_name: &str) -> Self {
		Self {
			id: id.into(),
			first_name: first_name.into(),
			last_name: last_name.into(),
		}
	}

	/// First name plus last initial, e.g. "Ada L.".
	fn short_label(&self) -> String {
		match self.last_name.chars().next() {
			Some(initial) => format!("{} {}.", self.first_name, initial),
			None => self.first_name.clone(),
		}
	}

	fn full_name(&self) -> String {
		format!("{} {}", self.first_name, self.last_name).trim().to_owned()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RelationshipKind {
	Family,
	Partner,
	Friend,
	Colleague,
}

impl RelationshipKind {
	fn color(self) -> &'static str {
		match self {
			RelationshipKind::Family => "#e15759",
			RelationshipKind::Partner => "#ff9da7",
			RelationshipKind::Friend => "#76b7b2",
			RelationshipKind::Colleague => "#8a8fa3",
		}
	}

	fn width(self) -> f64 {
		match self {
			RelationshipKind::Family | RelationshipKind::Partner => 3.0,
			RelationshipKind::Friend => 2.0,
			RelationshipKind::Colleague => 1.5,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
struct Relationship {
	from: String,
	to: String,
	kind: RelationshipKind,
}

fn rel(from: &str, to: &str, kind: RelationshipKind) -> Relationship {
	Relationship {
		from: from.into(),
		to: to.into(),
		kind,
	}
}

fn sample_people() -> Vec<Person> {
	[
		("ada", "Ada", "Lovelace"),
		("annabella", "Annabella", "Byron"),
		("charles", "Charles", "Babbage"),
		("mary", "Mary", "Somerville"),
		("grace", "Grace", "Hopper"),
		("alan", "Alan", "Turing"),
		("joan", "Joan", "Clarke"),
		("claude", "Claude", "Shannon"),
		("betty", "Betty", "Shannon"),
		("john", "John", "von Neumann"),
		("klara", "Klara", "Dan"),
		("edsger", "Edsger", "Dijkstra"),
		("barbara", "Barbara", "Liskov"),
	]
	.into_iter()
	.map(|(id, first, last)| Person::new(id, first, last))
	.collect()
}

fn sample_relationships() -> Vec<Relationship> {
	use RelationshipKind::*;
	vec![
		rel("annabella", "ada", Family),
		rel("ada", "charles", Colleague),
		rel("ada", "mary", Friend),
		rel("alan", "joan", Partner),
		rel("alan", "claude", Colleague),
		rel("claude", "betty", Partner),
		rel("john", "klara", Partner),
		rel("john", "alan", Colleague),
		rel("grace", "john", Colleague),
		rel("edsger", "barbara", Colleague),
		rel("barbara", "grace", Friend),
		rel("mary", "charles", Friend),
	]
}

const NEW_PEOPLE: &[(&str, &str)] = &[
	("Hedy", "Lamarr"),
	("Dennis", "Ritchie"),
	("Frances", "Allen"),
	("Ken", "Thompson"),
	("Margaret", "Hamilton"),
	("Donald", "Knuth"),
];

/// Translate people and relationships into the node/edge shape the canvas draws.
fn to_scene(people: &[Person], relationships: &[Relationship]) -> Scene {
	let nodes = people
		.iter()
		.enumerate()
		.map(|(i, person)| SceneNode {
			id: person.id.clone(),
			label: person.short_label(),
			full_name: person.full_name(),
			fill_color: COLORS[i % COLORS.len()].into(),
			position: Point::ZERO,
		})
		.collect();
	let edges = relationships
		.iter()
		.map(|r| SceneEdge {
			id: format!("{}:{}", r.from, r.to),
			source: r.from.clone(),
			target: r.to.clone(),
			color: r.kind.color().into(),
			width: r.kind.width(),
		})
		.collect();
	Scene { nodes, edges }
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let people = RwSignal::new(sample_people());
	let relationships = RwSignal::new(sample_relationships());
	let scene = Signal::derive(move || to_scene(&people.get(), &relationships.get()));
	let status = RwSignal::new(String::from("Click a person to select them."));

	let on_node_click = Callback::new(move |id: NodeId| {
		let name = people.with_untracked(|people| {
			people
				.iter()
				.find(|p| p.id == id)
				.map(Person::full_name)
		});
		status.set(format!("Selected {}", name.unwrap_or(id)));
	});
	let on_node_drag = Callback::new(move |(id, x, y): (NodeId, f64, f64)| {
		debug!("{id} dropped at ({x:.1}, {y:.1})");
		status.set(format!("Moved {id} to ({x:.0}, {y:.0})"));
	});

	let add_person = move |_| {
		let count = people.with_untracked(Vec::len);
		let (first, last) = NEW_PEOPLE[count % NEW_PEOPLE.len()];
		let id = format!("person-{count}");
		let friend = people.with_untracked(|people| people[count / 2].id.clone());
		people.update(|people| people.push(Person::new(id.clone(), first, last)));
		relationships.update(|rels| rels.push(rel(&id, &friend, RelationshipKind::Friend)));
		status.set(format!("Added {first} {last}"));
	};

	view! {
		<div class="fullscreen-graph">
			<SocialGraphCanvas
				scene=scene
				fullscreen=true
				on_node_click=on_node_click
				on_node_drag=on_node_drag
			/>
			<div class="graph-overlay">
				<h1>"Social Graph"</h1>
				<p class="subtitle">
					"Drag people to reposition. Scroll to zoom. Drag background to pan."
				</p>
				<button on:click=add_person>"Add person"</button>
				<p class="status">{move || status.get()}</p>
			</div>
		</div>
	}
}
