//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a positive 32-bit handle. Ids are handed out
//! sequentially starting at 1 and are never recycled within a session, so the
//! range `1..=max_id` enumerates every entity that ever existed. Destroyed ids
//! simply stop being alive.

use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A positive entity identifier. `0` is never a valid id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Construct an `EntityId` from its raw value.
    ///
    /// Returns `None` for `0`, which is reserved.
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Raw `u32` representation.
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    /// Iterate the ids `1..=max` in ascending order.
    pub fn range_to(max: u32) -> impl Iterator<Item = EntityId> {
        (1..=max).map(EntityId)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Allocates [`EntityId`]s sequentially and tracks which are alive.
///
/// `alive[i]` describes the id `i + 1`.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    alive: Vec<bool>,
    alive_count: usize,
}

impl EntityAllocator {
    /// Create a new, empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(id: EntityId) -> Option<usize> {
        (id.0 as usize).checked_sub(1)
    }

    /// Allocate the next [`EntityId`].
    pub fn allocate(&mut self) -> EntityId {
        self.alive.push(true);
        self.alive_count += 1;
        EntityId(self.alive.len() as u32)
    }

    /// Mark an entity as destroyed.
    ///
    /// Returns `true` if the entity was alive and is now dead, `false` if it
    /// was already dead or was never allocated.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        match Self::slot(id).and_then(|i| self.alive.get_mut(i)) {
            Some(slot) if *slot => {
                *slot = false;
                self.alive_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `id` was allocated and not yet destroyed.
    pub fn is_alive(&self, id: EntityId) -> bool {
        Self::slot(id)
            .and_then(|i| self.alive.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Highest id ever allocated (`0` when nothing was allocated).
    pub fn max_id(&self) -> u32 {
        self.alive.len() as u32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
