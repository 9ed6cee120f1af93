//! Livable area of a person's home, where neither the person nor the home
//! is guaranteed to exist.
//!
//! Run with `RUST_LOG=debug cargo run --example residence` to see each step.

use optional_value::{derive_functor, lift, OptionalValue};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct Room {
    width: u32,
    length: u32,
}

impl Room {
    fn area(&self) -> u32 {
        self.width * self.length
    }
}

/// A floor plan generic over what a room is, so the same plan can be mapped
/// from rooms to their areas.
#[derive_functor(R = room)]
#[derive(Debug, Clone)]
struct FloorPlan<R> {
    #[map_with(map_rooms)]
    rooms: Vec<R>,
}

fn map_rooms<R, R2>(rooms: Vec<R>, f: impl Fn(R) -> R2) -> Vec<R2> {
    rooms.into_iter().map(f).collect()
}

#[derive(Debug, Clone)]
struct Person {
    name: String,
    residence: OptionalValue<FloorPlan<Room>>,
}

fn directory() -> Vec<Person> {
    vec![
        Person {
            name: "Hazel".to_string(),
            residence: OptionalValue::absent(),
        },
        Person {
            name: "Basil".to_string(),
            residence: lift(FloorPlan {
                rooms: vec![
                    Room { width: 3, length: 4 },
                    Room { width: 2, length: 2 },
                ],
            }),
        },
    ]
}

fn find(people: &[Person], name: &str) -> OptionalValue<Person> {
    let found: OptionalValue<Person> = people.iter().find(|p| p.name == name).cloned().into();
    debug!(name, present = found.is_present(), "looked up person");
    found
}

fn livable_area(person: OptionalValue<Person>) -> OptionalValue<u32> {
    person
        .bind(|person| {
            debug!(name = %person.name, has_home = person.residence.is_present(), "reading residence");
            person.residence
        })
        .map(|plan| plan.map(|room: Room| room.area()))
        .bind(|areas| lift(areas.rooms.iter().sum::<u32>()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let people = directory();
    for name in ["Basil", "Hazel", "Nobody"] {
        match livable_area(find(&people, name)) {
            OptionalValue::Present(area) => info!(name, area, "livable area"),
            OptionalValue::Absent => info!(name, "no livable area"),
        }
    }
}
