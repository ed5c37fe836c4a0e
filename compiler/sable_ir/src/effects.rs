//! Memory effect flags for instructions and terminators.

use bitflags::bitflags;

bitflags! {
    /// What an instruction may do to memory.
    ///
    /// There is no notion of *which* memory is read or written.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct MemoryEffects: u8 {
        /// May read memory.
        const READ = 1 << 0;
        /// May write memory (including retain/release side effects).
        const WRITE = 1 << 1;
        /// May read and write memory. The default for opaque calls.
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

impl Default for MemoryEffects {
    fn default() -> Self {
        MemoryEffects::empty()
    }
}

impl MemoryEffects {
    #[inline]
    pub fn may_read(self) -> bool {
        self.contains(Self::READ)
    }

    #[inline]
    pub fn may_write(self) -> bool {
        self.contains(Self::WRITE)
    }
}

#[cfg(test)]
mod tests;
