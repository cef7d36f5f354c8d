//! World state: zones, actors and the station graph.
//!
//! Occupancy and item whereabouts are derived on demand from actor
//! positions and inventories; nothing is stored twice. Graph searches are
//! breadth-first over the zone adjacency lists and visit neighbors in list
//! order, so every result is deterministic.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use squad_types::{Actor, ActorId, ItemId, Marine, Zone, ZoneId};

/// Where an item currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLocation {
    /// Lying in a zone.
    Zone(ZoneId),
    /// Carried by a marine.
    Carried(ActorId),
}

/// The complete mutable state of one simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// Zones keyed by id.
    pub zones: BTreeMap<ZoneId, Zone>,
    /// Actors keyed by id. Actors are never removed.
    pub actors: BTreeMap<ActorId, Actor>,
}

impl WorldState {
    /// Build a world from zone and actor lists.
    pub fn new(zones: Vec<Zone>, actors: Vec<Actor>) -> Self {
        Self {
            zones: zones.into_iter().map(|z| (z.id.clone(), z)).collect(),
            actors: actors.into_iter().map(|a| (a.id().clone(), a)).collect(),
        }
    }

    /// Look up an actor.
    pub fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Look up a marine.
    pub fn marine(&self, id: &ActorId) -> Option<&Marine> {
        self.actors.get(id).and_then(Actor::as_marine)
    }

    /// Look up a zone.
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    /// All marines, alive or not, in id order.
    pub fn marines(&self) -> impl Iterator<Item = &Marine> {
        self.actors.values().filter_map(Actor::as_marine)
    }

    /// Number of marines still able to act.
    pub fn living_marines(&self) -> usize {
        self.marines().filter(|m| m.is_alive()).count()
    }

    /// Actors standing in a zone, in id order.
    pub fn occupants<'a>(&'a self, zone: &'a ZoneId) -> impl Iterator<Item = &'a Actor> + 'a {
        self.actors
            .values()
            .filter(move |a| a.position() == Some(zone))
    }

    /// Zones directly connected to `zone`.
    pub fn neighbors(&self, zone: &ZoneId) -> &[ZoneId] {
        self.zones
            .get(zone)
            .map(|z| z.adjacency.as_slice())
            .unwrap_or_default()
    }

    /// Hop counts from `start` to every reachable zone.
    pub fn distances_from(&self, start: &ZoneId) -> BTreeMap<ZoneId, u32> {
        let mut dist = BTreeMap::new();
        if !self.zones.contains_key(start) {
            return dist;
        }
        let mut queue = VecDeque::new();
        dist.insert(start.clone(), 0_u32);
        queue.push_back(start.clone());
        while let Some(current) = queue.pop_front() {
            let next = dist.get(&current).copied().unwrap_or(0).saturating_add(1);
            for neighbor in self.neighbors(&current) {
                if !dist.contains_key(neighbor) && self.zones.contains_key(neighbor) {
                    dist.insert(neighbor.clone(), next);
                    queue.push_back(neighbor.clone());
                }
            }
        }
        dist
    }

    /// First zone on a shortest path from `from` to `to`.
    ///
    /// `None` when already there or when `to` is unreachable.
    pub fn next_hop(&self, from: &ZoneId, to: &ZoneId) -> Option<ZoneId> {
        if from == to || !self.zones.contains_key(from) || !self.zones.contains_key(to) {
            return None;
        }
        let mut prev: BTreeMap<ZoneId, ZoneId> = BTreeMap::new();
        let mut queue = VecDeque::from([from.clone()]);
        while let Some(current) = queue.pop_front() {
            if &current == to {
                break;
            }
            for neighbor in self.neighbors(&current) {
                if neighbor != from && !prev.contains_key(neighbor) && self.zones.contains_key(neighbor) {
                    prev.insert(neighbor.clone(), current.clone());
                    queue.push_back(neighbor.clone());
                }
            }
        }
        // Walk back from the goal until the step whose predecessor is `from`.
        let mut step = to.clone();
        loop {
            let parent = prev.get(&step)?;
            if parent == from {
                return Some(step);
            }
            step = parent.clone();
        }
    }

    /// Find where an item is.
    pub fn item_location(&self, item: &ItemId) -> Option<ItemLocation> {
        if let Some(zone) = self.zones.values().find(|z| z.items.contains_key(item)) {
            return Some(ItemLocation::Zone(zone.id.clone()));
        }
        self.marines()
            .find(|m| m.inventory.contains_key(item))
            .map(|m| ItemLocation::Carried(m.id.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use rust_decimal_macros::dec;
    use squad_types::{Antagonist, Behavior, Director, Item, ItemState, Personality};

    use super::*;

    fn zone(id: &str, safe: bool, adjacency: &[&str]) -> Zone {
        Zone {
            id: ZoneId::new(id),
            name: id.to_uppercase(),
            description: String::new(),
            safe,
            adjacency: adjacency.iter().map(|z| ZoneId::new(*z)).collect(),
            items: BTreeMap::new(),
        }
    }

    pub(crate) fn marine(id: &str, zone: &str, stress: u8) -> Actor {
        Actor::Marine(Marine {
            id: ActorId::new(id),
            name: format!("Pvt. {id}"),
            personality: Personality::Professional,
            health: 3,
            stress,
            base_compliance: dec!(0.9),
            zone: ZoneId::new(zone),
            last_safe_zone: ZoneId::new("dropship"),
            inventory: BTreeMap::new(),
            last_action: None,
        })
    }

    /// dropship - corridor - {medbay, storage}; storage - reactor.
    pub(crate) fn station() -> WorldState {
        let mut storage = zone("storage", false, &["corridor", "reactor"]);
        storage.items.insert(
            ItemId::new("data_core"),
            Item {
                id: ItemId::new("data_core"),
                name: "Data Core".to_owned(),
                state: ItemState::Full,
                portable: true,
                hidden: false,
                difficulty: None,
            },
        );
        storage.items.insert(
            ItemId::new("ammo_cache"),
            Item {
                id: ItemId::new("ammo_cache"),
                name: "Ammo Cache".to_owned(),
                state: ItemState::Full,
                portable: true,
                hidden: true,
                difficulty: None,
            },
        );
        let mut medbay = zone("medbay", false, &["corridor"]);
        medbay.items.insert(
            ItemId::new("door_panel"),
            Item {
                id: ItemId::new("door_panel"),
                name: "Door Panel".to_owned(),
                state: ItemState::Locked,
                portable: false,
                hidden: false,
                difficulty: Some(8),
            },
        );
        WorldState::new(
            vec![
                zone("dropship", true, &["corridor"]),
                zone("corridor", false, &["dropship", "medbay", "storage"]),
                medbay,
                storage,
                zone("reactor", false, &["storage"]),
            ],
            vec![
                marine("hudson", "corridor", 0),
                marine("vasquez", "storage", 0),
                Actor::Antagonist(Antagonist {
                    id: ActorId::new("xeno"),
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
            ],
        )
    }

    #[test]
    fn distances_are_hop_counts() {
        let world = station();
        let dist = world.distances_from(&ZoneId::new("dropship"));
        assert_eq!(dist.get(&ZoneId::new("reactor")), Some(&3));
        assert_eq!(dist.get(&ZoneId::new("dropship")), Some(&0));
        assert!(world.distances_from(&ZoneId::new("nowhere")).is_empty());
    }

    #[test]
    fn next_hop_walks_toward_goal() {
        let world = station();
        let reactor = ZoneId::new("reactor");
        let dropship = ZoneId::new("dropship");
        assert_eq!(world.next_hop(&reactor, &dropship), Some(ZoneId::new("storage")));
        assert_eq!(
            world.next_hop(&ZoneId::new("corridor"), &dropship),
            Some(dropship.clone())
        );
        assert_eq!(world.next_hop(&dropship, &dropship), None);
    }

    #[test]
    fn occupancy_and_items_are_derived() {
        let world = station();
        let storage = ZoneId::new("storage");
        let ids: Vec<_> = world.occupants(&storage).map(|a| a.id().to_string()).collect();
        assert_eq!(ids, vec!["vasquez"]);
        assert_eq!(
            world.item_location(&ItemId::new("data_core")),
            Some(ItemLocation::Zone(storage))
        );
        assert_eq!(world.living_marines(), 2);
    }
}
