//! Lazy entity queries over a store's masks.

use super::component::ComponentMask;
use super::entity::EntityId;

/// Iterator over the live entities whose mask contains a required mask.
///
/// Produced by [`EntityStore::view`](super::EntityStore::view) and
/// [`EntityStore::view_all`](super::EntityStore::view_all). A view is
/// single-pass; build a new one to run the query again.
#[derive(Clone, Debug)]
pub struct View<'a> {
    masks: &'a [ComponentMask],
    versions: &'a [u32],
    alive: &'a [bool],
    required: ComponentMask,
    next: usize,
}

impl<'a> View<'a> {
    pub(super) fn new(
        masks: &'a [ComponentMask],
        versions: &'a [u32],
        alive: &'a [bool],
        required: ComponentMask,
    ) -> Self {
        Self {
            masks,
            versions,
            alive,
            required,
            next: 0,
        }
    }

    /// The mask every yielded entity contains.
    #[must_use]
    pub const fn required(&self) -> &ComponentMask {
        &self.required
    }
}

impl Iterator for View<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while self.next < self.masks.len() {
            let index = self.next;
            self.next += 1;

            if self.alive[index] && self.masks[index].contains_all(&self.required) {
                #[allow(clippy::cast_possible_truncation)]
                let index32 = index as u32;
                return Some(EntityId::new(index32, self.versions[index]));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.masks.len() - self.next))
    }
}
