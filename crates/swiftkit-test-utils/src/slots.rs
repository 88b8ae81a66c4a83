//! Slot+generation table that hands out fake foreign addresses.
//!
//! Freed addresses have stale generations and resolve to `None` instead of
//! aliasing a newer object, which is what lets [`MockHeap`](crate::MockHeap)
//! detect double frees and use-after-free.

use swiftkit_core::ForeignAddress;

/// Address layout: upper 32 bits = slot index + 1, lower 32 bits = generation.
///
/// The `+ 1` keeps every address non-null. Assumes a 64-bit host.
fn encode(slot: u32, generation: u32) -> ForeignAddress {
    ForeignAddress((((slot as u64 + 1) << 32) | generation as u64) as usize)
}

fn decode(address: ForeignAddress) -> Option<(u32, u32)> {
    let raw = address.get() as u64;
    let slot = ((raw >> 32) as u32).checked_sub(1)?;
    Some((slot, raw as u32))
}

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// Maps fake foreign addresses to owned values, reusing slots via a free list.
pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> SlotTable<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value and return its address.
    pub fn insert(&mut self, value: T) -> ForeignAddress {
        self.len += 1;
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            encode(slot_idx, slot.generation)
        } else {
            let slot_idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(value),
            });
            encode(slot_idx, 0)
        }
    }

    /// The value at `address`, or `None` if it was freed or never existed.
    pub fn get(&self, address: ForeignAddress) -> Option<&T> {
        let (slot_idx, generation) = decode(address)?;
        let slot = self.slots.get(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.data.as_ref()
    }

    pub fn get_mut(&mut self, address: ForeignAddress) -> Option<&mut T> {
        let (slot_idx, generation) = decode(address)?;
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.data.as_mut()
    }

    /// Remove and return the value at `address`. A second remove returns
    /// `None`.
    ///
    /// A slot whose generation wraps to 0 is retired instead of recycled,
    /// so stale addresses from the first epoch never resolve again.
    pub fn remove(&mut self, address: ForeignAddress) -> Option<T> {
        let (slot_idx, generation) = decode(address)?;
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(slot_idx);
        }
        self.len -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_never_null() {
        let mut table = SlotTable::new();
        let a = table.insert(1i32);
        assert!(!a.is_null());
        assert_eq!(table.get(ForeignAddress::NULL), None);
    }

    #[test]
    fn freed_address_is_stale() {
        let mut table = SlotTable::new();
        let a = table.insert(1i32);
        assert_eq!(table.remove(a), Some(1));
        assert_eq!(table.get(a), None);
        assert_eq!(table.remove(a), None);
        assert!(table.is_empty());
    }

    #[test]
    fn reused_slot_gets_new_address() {
        let mut table = SlotTable::new();
        let a = table.insert(1i32);
        table.remove(a);
        let b = table.insert(2i32);
        assert_ne!(a, b);
        assert_eq!(decode(a).map(|d| d.0), decode(b).map(|d| d.0));
        assert_eq!(table.get(b), Some(&2));
        assert_eq!(table.get(a), None);
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = SlotTable::new();
        let a = table.insert(1i32);
        table.remove(a);
        table.slots[0].generation = u32::MAX;
        let b = table.insert(2i32);
        table.remove(b);
        assert_eq!(table.slots[0].generation, 0);
        assert!(!table.free_list.contains(&0));
        assert_eq!(table.get(a), None);
        let c = table.insert(3i32);
        assert_ne!(decode(c).map(|d| d.0), Some(0));
    }

    #[test]
    fn get_mut_and_len() {
        let mut table = SlotTable::new();
        let a = table.insert(10i32);
        let _b = table.insert(20i32);
        *table.get_mut(a).unwrap() += 1;
        assert_eq!(table.get(a), Some(&11));
        assert_eq!(table.len(), 2);
    }
}
