use crate::descriptor::EntityDescriptor;
use crate::entity::EntityId;
use foundation::handles::Handle;

/// Entity collection of a globe renderer.
pub trait EntityStore {
    fn add(&mut self, descriptor: EntityDescriptor) -> EntityId;

    /// Returns false if `id` was not (or no longer) present.
    fn remove(&mut self, id: EntityId) -> bool;

    fn contains(&self, id: EntityId) -> bool;

    /// Removes every id in `ids` that is still present.
    fn remove_all(&mut self, ids: &[EntityId]) -> usize {
        ids.iter().filter(|id| self.remove(**id)).count()
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    descriptor: Option<EntityDescriptor>,
}

/// In-memory entity collection with generational ids.
///
/// Removed slots are reused; a stale id never aliases the new occupant.
#[derive(Debug, Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityDescriptor> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.descriptor.as_ref()
    }

    /// Live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityDescriptor)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let d = slot.descriptor.as_ref()?;
            Some((EntityId(Handle::new(idx as u32, slot.generation)), d))
        })
    }

    pub fn texts(&self) -> Vec<&str> {
        self.iter().filter_map(|(_, d)| d.text()).collect()
    }
}

impl EntityStore for World {
    fn add(&mut self, descriptor: EntityDescriptor) -> EntityId {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.descriptor = Some(descriptor);
            return EntityId(Handle::new(idx, slot.generation));
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            descriptor: Some(descriptor),
        });
        EntityId(Handle::new(idx, 0))
    }

    fn remove(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index() as usize) else {
            return false;
        };
        if slot.generation != id.generation() || slot.descriptor.is_none() {
            return false;
        }
        slot.descriptor = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        true
    }

    fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, World};
    use crate::descriptor::{EntityDescriptor, LabelStyle};
    use foundation::math::Vec3;

    fn label(text: &str) -> EntityDescriptor {
        EntityDescriptor::Label {
            position: Vec3::ZERO,
            text: text.to_string(),
            style: LabelStyle::default(),
        }
    }

    #[test]
    fn add_remove_contains() {
        let mut world = World::new();
        let a = world.add(label("a"));
        let b = world.add(label("b"));
        assert!(world.contains(a));
        assert_eq!(world.len(), 2);

        assert!(world.remove(a));
        assert!(!world.remove(a));
        assert!(!world.contains(a));
        assert!(world.contains(b));
        assert_eq!(world.texts(), vec!["b"]);
    }

    #[test]
    fn reused_slot_does_not_alias_stale_id() {
        let mut world = World::new();
        let a = world.add(label("a"));
        world.remove(a);
        let c = world.add(label("c"));
        assert_eq!(c.index(), a.index());
        assert!(!world.contains(a));
        assert!(!world.remove(a));
        assert!(world.contains(c));
    }

    #[test]
    fn remove_all_counts_only_live_ids() {
        let mut world = World::new();
        let a = world.add(label("a"));
        let b = world.add(label("b"));
        world.remove(b);
        assert_eq!(world.remove_all(&[a, b]), 1);
        assert!(world.is_empty());
    }
}
