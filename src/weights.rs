//! Caller-owned storage for the weights of a single ray.

use crate::system_matrix::PixelWeight;

/// Fixed-capacity buffer of pixel weights.
///
/// The storage is allocated once, up front, and reused for ray after ray:
/// allocating anew for each ray has a noticeable runtime cost in the inner
/// loop. Nothing is ever stored beyond `capacity`; attempts to do so are
/// reported, not silently dropped.
#[derive(Clone, Debug)]
pub struct WeightBuffer {
    entries: Vec<PixelWeight>,
    capacity: usize,
}

/// The buffer is full. Carries the rejected element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Full(pub PixelWeight);

impl WeightBuffer {

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize { self.capacity }

    /// Number of entries currently stored
    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn is_full(&self) -> bool { self.entries.len() >= self.capacity }

    /// Throw away previous ray's values
    pub fn clear(&mut self) { self.entries.clear(); }

    pub fn try_push(&mut self, element: PixelWeight) -> Result<(), Full> {
        if self.is_full() { return Err(Full(element)) }
        self.entries.push(element);
        Ok(())
    }

    pub fn as_slice(&self) -> &[PixelWeight] { &self.entries }

    pub fn iter(&self) -> std::slice::Iter<PixelWeight> { self.entries.iter() }
}

impl<'a> IntoIterator for &'a WeightBuffer {
    type Item = PixelWeight;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, PixelWeight>>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}
