use crate::genome::Organism;

/// Stable handle to an organism stored in an [`OrganismArena`].
///
/// Handles are reused after the organism they point to is freed, so a pool
/// must drop a handle in the same step that frees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrganismId(u32);

impl OrganismId {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Slot storage for every organism of a run.
///
/// Pools (population, nursery, staging) hold only [`OrganismId`]s, so moving
/// an individual between pools never copies it. Freed slots are recycled
/// before the backing vector grows.
#[derive(Debug, Default, Clone)]
pub struct OrganismArena {
    slots: Vec<Option<Organism>>,
    free: Vec<u32>,
    live: usize,
}

impl OrganismArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live organisms.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Store an organism and return its handle.
    pub fn alloc(&mut self, organism: Organism) -> OrganismId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(organism);
                OrganismId(index)
            }
            None => {
                self.slots.push(Some(organism));
                OrganismId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// Remove an organism, returning it if the handle was live.
    pub fn free(&mut self, id: OrganismId) -> Option<Organism> {
        let organism = self.slots.get_mut(id.0 as usize)?.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(organism)
    }

    #[inline]
    pub fn get(&self, id: OrganismId) -> Option<&Organism> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Mutable access to two distinct organisms at once.
    ///
    /// Returns `None` if the handles are equal or either is not live.
    pub fn pair_mut(
        &mut self,
        a: OrganismId,
        b: OrganismId,
    ) -> Option<(&mut Organism, &mut Organism)> {
        let (i, j) = (a.0 as usize, b.0 as usize);
        if i == j || i >= self.slots.len() || j >= self.slots.len() {
            return None;
        }
        if i < j {
            let (left, right) = self.slots.split_at_mut(j);
            Some((left[i].as_mut()?, right[0].as_mut()?))
        } else {
            let (left, right) = self.slots.split_at_mut(i);
            Some((right[0].as_mut()?, left[j].as_mut()?))
        }
    }
}
