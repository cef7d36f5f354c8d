//! The built-in starting mission.
//!
//! A derelict station with five zones: the dropship (safe, extraction) opens
//! onto a corridor, which leads to the medbay and to storage; the reactor
//! lies beyond storage. Three marines start spread out between the corridor
//! and the medbay, the creature waits hidden in the reactor, and the
//! director watches everything.

use std::collections::BTreeMap;

use squad_agents::PersonalityTable;
use squad_events::WorldState;
use squad_types::{
    Actor, ActorId, Antagonist, Behavior, Director, Item, ItemId, ItemState, Marine, Personality,
    Zone, ZoneId,
};

/// Health every marine starts with.
pub const MARINE_HEALTH: i32 = 3;

/// Id of the safe extraction zone.
pub const DROPSHIP: &str = "dropship";

/// Id of the mission objective.
pub const DATA_CORE: &str = "data_core";

/// Helper to build a [`Zone`].
fn zone(id: &str, name: &str, safe: bool, adjacency: &[&str], description: &str) -> Zone {
    Zone {
        id: ZoneId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        safe,
        adjacency: adjacency.iter().map(|z| ZoneId::new(*z)).collect(),
        items: BTreeMap::new(),
    }
}

/// Helper to build an [`Item`].
fn item(id: &str, name: &str, state: ItemState, portable: bool, hidden: bool, difficulty: Option<u8>) -> Item {
    Item {
        id: ItemId::new(id),
        name: name.to_owned(),
        state,
        portable,
        hidden,
        difficulty,
    }
}

/// Helper to place items in a zone.
fn stock(zone: &mut Zone, items: Vec<Item>) {
    for item in items {
        zone.items.insert(item.id.clone(), item);
    }
}

/// Helper to build a [`Marine`] with base compliance from the personality
/// table.
fn marine(
    id: &str,
    name: &str,
    personality: Personality,
    zone: &str,
    stress: u8,
    personalities: &PersonalityTable,
) -> Actor {
    Actor::Marine(Marine {
        id: ActorId::new(id),
        name: name.to_owned(),
        personality,
        health: MARINE_HEALTH,
        stress,
        base_compliance: personalities.profile(personality).base_compliance,
        zone: ZoneId::new(zone),
        last_safe_zone: ZoneId::new(DROPSHIP),
        inventory: BTreeMap::new(),
        last_action: None,
    })
}

/// Create the starting world.
pub fn starting_world(personalities: &PersonalityTable) -> WorldState {
    let dropship = zone(
        DROPSHIP,
        "Dropship",
        true,
        &["corridor"],
        "The squad's dropship, engines idling. Bright, armored and the only way off the station.",
    );
    let corridor = zone(
        "corridor",
        "Main Corridor",
        false,
        &["dropship", "medbay", "storage"],
        "A long service corridor lit by amber emergency lamps. Condensation drips from the ducts.",
    );

    let mut medbay = zone(
        "medbay",
        "Medical Bay B",
        false,
        &["corridor"],
        "A sterile white medical facility. Sparks fly from a damaged door panel.",
    );
    stock(
        &mut medbay,
        vec![
            item("door_panel", "Door Control Panel", ItemState::Locked, false, false, Some(8)),
            item("medical_scanner", "Medical Scanner", ItemState::Full, false, false, None),
            item("supply_cabinet", "Supply Cabinet", ItemState::Locked, false, false, Some(9)),
            item("medkit", "Medkit", ItemState::Full, true, true, None),
        ],
    );

    let mut storage = zone(
        "storage",
        "Cargo Storage",
        false,
        &["corridor", "reactor"],
        "Stacked cargo crates and a toppled loader. Something has clawed through the shrink wrap.",
    );
    stock(
        &mut storage,
        vec![
            item(DATA_CORE, "Data Core", ItemState::Full, true, false, None),
            item("ammo_cache", "Ammo Cache", ItemState::Full, true, true, None),
        ],
    );

    let reactor = zone(
        "reactor",
        "Reactor Room",
        false,
        &["storage"],
        "Heat shimmers over the reactor housing. The vents here are big enough to crawl through.",
    );

    let actors = vec![
        marine("hudson", "Pvt. Hudson", Personality::Aggressive, "corridor", 2, personalities),
        marine("vasquez", "Pvt. Vasquez", Personality::Professional, "corridor", 1, personalities),
        marine("miller", "Vanessa Miller", Personality::Cautious, "medbay", 1, personalities),
        Actor::Antagonist(Antagonist {
            id: ActorId::new("xenomorph"),
            name: "Xenomorph".to_owned(),
            zone: ZoneId::new("reactor"),
            hidden: true,
            behavior: Behavior::Inactive,
        }),
        Actor::Director(Director {
            id: ActorId::new("director"),
            name: "Director".to_owned(),
            adjustments: Vec::new(),
            hazard_level: 0,
        }),
    ];

    WorldState::new(vec![dropship, corridor, medbay, storage, reactor], actors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use squad_events::ItemLocation;
    use squad_types::Role;

    use super::*;

    #[test]
    fn starting_world_has_five_zones_and_five_actors() {
        let world = starting_world(&PersonalityTable::default());
        assert_eq!(world.zones.len(), 5);
        assert_eq!(world.actors.len(), 5);
        assert_eq!(world.living_marines(), 3);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let world = starting_world(&PersonalityTable::default());
        for zone in world.zones.values() {
            for neighbor in &zone.adjacency {
                assert!(
                    world.neighbors(neighbor).contains(&zone.id),
                    "{} -> {} has no way back",
                    zone.id,
                    neighbor
                );
            }
        }
    }

    #[test]
    fn every_zone_is_reachable_from_the_dropship() {
        let world = starting_world(&PersonalityTable::default());
        let dist = world.distances_from(&ZoneId::new(DROPSHIP));
        assert_eq!(dist.len(), 5);
        assert_eq!(dist.get(&ZoneId::new("reactor")), Some(&3));
    }

    #[test]
    fn objective_starts_in_storage() {
        let world = starting_world(&PersonalityTable::default());
        assert_eq!(
            world.item_location(&ItemId::new(DATA_CORE)),
            Some(ItemLocation::Zone(ZoneId::new("storage")))
        );
    }

    #[test]
    fn compliance_comes_from_the_personality_table() {
        let world = starting_world(&PersonalityTable::default());
        let hudson = world.marine(&ActorId::new("hudson")).unwrap();
        assert_eq!(hudson.base_compliance, dec!(0.7));
        let antagonist = world.actor(&ActorId::new("xenomorph")).unwrap();
        assert_eq!(antagonist.role(), Role::Antagonist);
        assert!(!antagonist.is_visible());
    }
}
