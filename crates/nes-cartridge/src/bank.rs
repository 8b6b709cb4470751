//! Banked ROM/RAM: owned pages mapped into fixed-size address windows.

/// Memory divided into `window`-sized pages, with each slot of the address
/// window holding the index of the page it shows.
///
/// Page numbers wrap modulo the page count, which is how the real boards
/// behave when a game writes a bank number larger than the chip.
#[derive(Debug, Clone)]
pub(crate) struct BankedMemory {
    data: Vec<u8>,
    window: usize,
    slots: Vec<usize>,
    writable: bool,
}

impl BankedMemory {
    /// Slot `i` starts out showing page `i`.
    pub(crate) fn new(data: Vec<u8>, window: usize, slot_count: usize, writable: bool) -> Self {
        let mut memory = Self {
            data,
            window,
            slots: vec![0; slot_count],
            writable,
        };
        for slot in 0..slot_count {
            memory.map(slot, slot);
        }
        memory
    }

    /// `size` bytes of zeroed RAM.
    pub(crate) fn ram(size: usize, window: usize, slot_count: usize) -> Self {
        Self::new(vec![0; size], window, slot_count, true)
    }

    pub(crate) fn page_count(&self) -> usize {
        (self.data.len() / self.window).max(1)
    }

    pub(crate) fn map(&mut self, slot: usize, page: usize) {
        let count = self.page_count();
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = page % count;
        }
    }

    pub(crate) fn map_last(&mut self, slot: usize) {
        self.map(slot, self.page_count() - 1);
    }

    fn index(&self, offset: usize) -> Option<usize> {
        if self.data.is_empty() {
            return None;
        }
        let slot = (offset / self.window) % self.slots.len();
        let index = self.slots[slot] * self.window + offset % self.window;
        Some(index % self.data.len())
    }

    /// Read at `offset` from the start of the whole window.
    pub(crate) fn read(&self, offset: usize) -> u8 {
        self.index(offset).map_or(0, |i| self.data[i])
    }

    /// Writes to ROM are dropped.
    pub(crate) fn write(&mut self, offset: usize, value: u8) {
        if !self.writable {
            return;
        }
        if let Some(i) = self.index(offset) {
            self.data[i] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(pages: usize, window: usize) -> Vec<u8> {
        (0..pages * window).map(|i| (i / window) as u8).collect()
    }

    #[test]
    fn slots_start_on_consecutive_pages() {
        let mem = BankedMemory::new(numbered(4, 0x100), 0x100, 2, false);
        assert_eq!(mem.read(0x000), 0);
        assert_eq!(mem.read(0x100), 1);
    }

    #[test]
    fn single_page_mirrors_across_slots() {
        let mem = BankedMemory::new(numbered(1, 0x100), 0x100, 2, false);
        assert_eq!(mem.read(0x0FF), 0);
        assert_eq!(mem.read(0x1FF), 0);
    }

    #[test]
    fn page_numbers_wrap() {
        let mut mem = BankedMemory::new(numbered(4, 0x100), 0x100, 2, false);
        mem.map(0, 6);
        assert_eq!(mem.read(0x10), 2);
        mem.map_last(0);
        assert_eq!(mem.read(0x10), 3);
    }

    #[test]
    fn rom_ignores_writes() {
        let mut mem = BankedMemory::new(numbered(2, 0x100), 0x100, 2, false);
        mem.write(0x80, 0xEE);
        assert_eq!(mem.read(0x80), 0);

        let mut ram = BankedMemory::ram(0x200, 0x100, 2);
        ram.write(0x180, 0xEE);
        assert_eq!(ram.read(0x180), 0xEE);
    }

    #[test]
    fn empty_memory_reads_zero() {
        let mem = BankedMemory::new(Vec::new(), 0x100, 1, false);
        assert_eq!(mem.read(0x10), 0);
    }
}
