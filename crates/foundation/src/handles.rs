/// Generational handle: (index, generation).
///
/// Indices may be reused once a slot is freed; the generation tells a stale
/// handle apart from the slot's current occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn generation(self) -> u32 {
        self.1
    }
}

/// Hands out handles, recycling freed indices under a bumped generation.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: Vec<u32>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> Handle {
        if let Some(index) = self.free.pop() {
            let i = index as usize;
            self.live[i] = true;
            return Handle::new(index, self.generations[i]);
        }
        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        Handle::new(index, 0)
    }

    /// Returns `false` for stale or unknown handles.
    pub fn free(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        let i = handle.index() as usize;
        self.live[i] = false;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free.push(handle.index());
        true
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        let i = handle.index() as usize;
        self.live.get(i).copied().unwrap_or(false) && self.generations[i] == handle.generation()
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, HandleAllocator};

    #[test]
    fn freed_indices_come_back_with_new_generation() {
        let mut a = HandleAllocator::new();
        let h0 = a.alloc();
        assert_eq!(h0, Handle::new(0, 0));
        assert!(a.free(h0));
        let h1 = a.alloc();
        assert_eq!(h1, Handle::new(0, 1));
        assert!(!a.is_live(h0));
        assert!(a.is_live(h1));
    }

    #[test]
    fn double_free_is_rejected() {
        let mut a = HandleAllocator::new();
        let h = a.alloc();
        assert!(a.free(h));
        assert!(!a.free(h));
        assert!(!a.free(Handle::new(42, 0)));
    }
}
