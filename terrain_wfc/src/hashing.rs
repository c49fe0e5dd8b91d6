use std::hash::Hasher;

use crate::category::Category;

/// FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomly keyed per process, so map digests that have to
/// match across runs go through this instead.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Digest of a row-major category layout, dimensions included.
pub fn digest_cells<I>(width: u32, height: u32, cells: I) -> u64
where
    I: IntoIterator<Item = Category>,
{
    let mut hasher = FnvHasher::new();
    hasher.write_u32(width);
    hasher.write_u32(height);
    for category in cells {
        hasher.write_u8(category.index() as u8);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_offset_basis() {
        assert_eq!(FnvHasher::new().finish(), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn known_vector() {
        let mut hasher = FnvHasher::new();
        hasher.write(b"a");
        assert_eq!(hasher.finish(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn digest_depends_on_shape() {
        let cells = [Category::from_index(0), Category::from_index(1)];
        assert_ne!(digest_cells(2, 1, cells), digest_cells(1, 2, cells));
        assert_eq!(digest_cells(2, 1, cells), digest_cells(2, 1, cells));
    }
}
