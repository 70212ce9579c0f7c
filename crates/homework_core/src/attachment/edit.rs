//! Working copy of task images during an edit.
//!
//! Deletions are positional and apply to the already-shifted list, so two
//! deletes at index 1 remove what were originally elements 1 and 2.

/// Uncommitted image list shown in an edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageEditSession {
    working: Vec<String>,
}

impl ImageEditSession {
    /// Copies the committed images; the originals are never modified.
    pub fn new(existing: &[String]) -> Self {
        Self {
            working: existing.to_vec(),
        }
    }

    pub fn images(&self) -> &[String] {
        &self.working
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// Removes the image at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.working.len() {
            Some(self.working.remove(index))
        } else {
            None
        }
    }

    /// Surviving images followed by `new_images`.
    pub fn confirm(self, new_images: Vec<String>) -> Vec<String> {
        let mut images = self.working;
        images.extend(new_images);
        images
    }
}

/// Applies `deletions` in order to a working copy of `existing`, then
/// appends `new_images`.
pub fn reconcile_on_edit(
    existing: &[String],
    deletions: &[usize],
    new_images: Vec<String>,
) -> Vec<String> {
    let mut session = ImageEditSession::new(existing);
    for &index in deletions {
        session.remove(index);
    }
    session.confirm(new_images)
}
