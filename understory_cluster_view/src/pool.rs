// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed pool of reusable renderable slots.
//!
//! Slots live in a flat arena and are handed out from an index free list.
//! Binding and releasing are the only ways a slot changes owner; listeners
//! are attached on bind and detached on release, before the slot returns to
//! the free list.

use core::fmt::Debug;

use hashbrown::HashMap;
use kurbo::Point;
use log::{trace, warn};
use understory_tile_grid::{ItemIndex, TileId};

use crate::wire::ClusterEntity;

/// Handle to one slot of a [`RenderablePool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
    /// Position of the slot in the pool.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interaction handlers attached to a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Listeners {
    /// Hover handler attached.
    pub hover: bool,
    /// Click handler attached.
    pub click: bool,
}

impl Listeners {
    const ATTACHED: Self = Self {
        hover: true,
        click: true,
    };
}

/// A pointer interaction routed to a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Pointer hovers the slot.
    Hover,
    /// Pointer clicked the slot.
    Click,
}

/// What a bound slot shows.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// Cluster tile that first delivered the item.
    pub tile: TileId,
    /// The cluster and its representative.
    pub entity: ClusterEntity,
}

impl Binding {
    /// Index of the bound item.
    #[must_use]
    pub fn item(&self) -> ItemIndex {
        self.entity.representative.index
    }
}

/// One pooled renderable.
#[derive(Clone, Debug, Default)]
pub struct Slot {
    binding: Option<Binding>,
    position: Point,
    visible: bool,
    listeners: Listeners,
}

impl Slot {
    /// The current binding, if any.
    #[must_use]
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Screen position of the item.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Whether the slot is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handlers currently attached.
    #[must_use]
    pub fn listeners(&self) -> Listeners {
        self.listeners
    }
}

/// A change a UI layer has to render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlotChange {
    /// `slot` now shows `item`.
    Bound {
        /// The slot.
        slot: SlotId,
        /// The item now shown.
        item: ItemIndex,
        /// Screen position.
        position: Point,
        /// Visibility after culling.
        visible: bool,
    },
    /// `slot` moved or changed visibility.
    Moved {
        /// The slot.
        slot: SlotId,
        /// New screen position.
        position: Point,
        /// New visibility.
        visible: bool,
    },
    /// `slot` no longer shows `item` and is hidden.
    Released {
        /// The slot.
        slot: SlotId,
        /// The item it showed.
        item: ItemIndex,
    },
}

/// Arena of renderable slots with an index free list.
pub struct RenderablePool {
    slots: Vec<Slot>,
    free: Vec<SlotId>,
    by_item: HashMap<ItemIndex, SlotId>,
    changes: Vec<SlotChange>,
}

impl Debug for RenderablePool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderablePool")
            .field("capacity", &self.slots.len())
            .field("bound", &self.by_item.len())
            .field("pending_changes", &self.changes.len())
            .finish_non_exhaustive()
    }
}

impl RenderablePool {
    /// Creates a pool of `capacity` unused slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Slot> = (0..capacity).map(|_| Slot::default()).collect();
        // Popped from the back, so slot 0 is handed out first.
        let free = (0..capacity)
            .rev()
            .filter_map(|i| u32::try_from(i).ok())
            .map(SlotId)
            .collect();
        Self {
            slots,
            free,
            by_item: HashMap::new(),
            changes: Vec::new(),
        }
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of bound slots.
    #[must_use]
    pub fn bound_len(&self) -> usize {
        self.by_item.len()
    }

    /// Number of unused slots.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Looks up a slot.
    #[must_use]
    pub fn slot(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot.index())
    }

    /// The slot showing `item`, if any.
    #[must_use]
    pub fn slot_for_item(&self, item: ItemIndex) -> Option<SlotId> {
        self.by_item.get(&item).copied()
    }

    /// Iterates over bound slots.
    pub fn bound(&self) -> impl Iterator<Item = (SlotId, &Binding)> + '_ {
        self.by_item.values().filter_map(|id| {
            self.slots
                .get(id.index())
                .and_then(|slot| slot.binding.as_ref())
                .map(|binding| (*id, binding))
        })
    }

    /// Binds an unused slot to `entity` and attaches its listeners.
    ///
    /// Returns `None` if the item is already shown or the pool is exhausted.
    pub fn bind(
        &mut self,
        tile: TileId,
        entity: ClusterEntity,
        position: Point,
        visible: bool,
    ) -> Option<SlotId> {
        let item = entity.representative.index;
        if self.by_item.contains_key(&item) {
            trace!("item {item} already bound, skipping");
            return None;
        }
        let Some(id) = self.free.pop() else {
            warn!(
                "renderable pool exhausted ({} slots), item {item} not shown",
                self.slots.len()
            );
            return None;
        };
        let slot = &mut self.slots[id.index()];
        slot.binding = Some(Binding { tile, entity });
        slot.position = position;
        slot.visible = visible;
        slot.listeners = Listeners::ATTACHED;
        self.by_item.insert(item, id);
        self.changes.push(SlotChange::Bound {
            slot: id,
            item,
            position,
            visible,
        });
        Some(id)
    }

    /// Moves a bound slot. Unbound slots and no-op moves are ignored.
    pub fn place(&mut self, id: SlotId, position: Point, visible: bool) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        if slot.binding.is_none() || (slot.position == position && slot.visible == visible) {
            return;
        }
        slot.position = position;
        slot.visible = visible;
        self.changes.push(SlotChange::Moved {
            slot: id,
            position,
            visible,
        });
    }

    /// Unbinds a slot and returns it to the free list.
    ///
    /// Listeners are detached and the slot hidden first. Returns the
    /// previous binding, or `None` if the slot was not bound.
    pub fn release(&mut self, id: SlotId) -> Option<Binding> {
        let slot = self.slots.get_mut(id.index())?;
        let binding = slot.binding.take()?;
        slot.listeners = Listeners::default();
        slot.visible = false;
        let item = binding.item();
        self.by_item.remove(&item);
        self.free.push(id);
        self.changes.push(SlotChange::Released { slot: id, item });
        Some(binding)
    }

    /// Routes an interaction to a slot.
    ///
    /// Answers with the binding only while the slot is bound and the
    /// matching listener is attached.
    #[must_use]
    pub fn interact(&self, id: SlotId, interaction: Interaction) -> Option<&Binding> {
        let slot = self.slots.get(id.index())?;
        let attached = match interaction {
            Interaction::Hover => slot.listeners.hover,
            Interaction::Click => slot.listeners.click,
        };
        if attached { slot.binding.as_ref() } else { None }
    }

    /// Takes the changes recorded since the last call, oldest first.
    pub fn drain_changes(&mut self) -> Vec<SlotChange> {
        core::mem::take(&mut self.changes)
    }
}
