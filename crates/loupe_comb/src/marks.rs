//! Pass-scoped visited marks.
//!
//! A node counted once in a pass must not be counted again, e.g. when a
//! statement is listed twice in one scope. Marks live outside the tree so
//! that independent passes (different scopes, different threads) never see
//! each other's state.

use loupe_ir::ExprId;

/// Generation-stamped visited set over expression IDs.
#[derive(Debug, Clone)]
pub struct PassMarks {
    stamps: Vec<u32>,
    generation: u32,
}

impl PassMarks {
    /// Creates a mark set sized for `capacity` expressions, already inside
    /// a fresh pass.
    pub fn new(capacity: usize) -> Self {
        Self {
            stamps: vec![0; capacity],
            generation: 1,
        }
    }

    /// Starts a new pass; every node reads as unvisited afterwards.
    pub fn begin_pass(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
    }

    /// Returns `true` if `id` was marked during the current pass.
    pub fn is_counted(&self, id: ExprId) -> bool {
        self.stamps
            .get(id.as_raw() as usize)
            .is_some_and(|&stamp| stamp == self.generation)
    }

    /// Marks `id` as visited in the current pass.
    pub fn mark(&mut self, id: ExprId) {
        let index = id.as_raw() as usize;
        if index >= self.stamps.len() {
            self.stamps.resize(index + 1, 0);
        }
        self.stamps[index] = self.generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_then_query() {
        let mut marks = PassMarks::new(4);
        let id = ExprId::from_raw(2);
        assert!(!marks.is_counted(id));
        marks.mark(id);
        assert!(marks.is_counted(id));
        assert!(!marks.is_counted(ExprId::from_raw(1)));
    }

    #[test]
    fn new_pass_forgets_marks() {
        let mut marks = PassMarks::new(2);
        marks.mark(ExprId::from_raw(0));
        marks.begin_pass();
        assert!(!marks.is_counted(ExprId::from_raw(0)));
    }

    #[test]
    fn grows_on_demand() {
        let mut marks = PassMarks::new(0);
        marks.mark(ExprId::from_raw(10));
        assert!(marks.is_counted(ExprId::from_raw(10)));
    }

    #[test]
    fn generation_wraparound_clears() {
        let mut marks = PassMarks::new(1);
        marks.generation = u32::MAX;
        marks.mark(ExprId::from_raw(0));
        marks.begin_pass();
        assert!(!marks.is_counted(ExprId::from_raw(0)));
        marks.mark(ExprId::from_raw(0));
        assert!(marks.is_counted(ExprId::from_raw(0)));
    }
}
