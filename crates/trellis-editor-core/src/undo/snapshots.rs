//! Bounded stack of serialized content snapshots.

/// Snapshot history with a cursor and a total-size ceiling.
///
/// Sizes are counted in chars. When the total exceeds the ceiling the
/// oldest snapshots are evicted and the cursor shifts down with them.
#[derive(Debug, Clone)]
pub struct UndoSnapshots {
    snapshots: Vec<String>,
    current: Option<usize>,
    total_size: usize,
    max_size: usize,
}

impl UndoSnapshots {
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            current: None,
            total_size: 0,
            max_size,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&str> {
        self.snapshots.get(self.current?).map(String::as_str)
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn target(&self, delta: isize) -> Option<usize> {
        let index = self.current?.checked_add_signed(delta)?;
        (index < self.snapshots.len()).then_some(index)
    }

    pub fn can_move(&self, delta: isize) -> bool {
        self.target(delta).is_some()
    }

    /// Move the cursor by `delta` and return the snapshot there.
    ///
    /// Out of range leaves the cursor where it is.
    pub fn move_by(&mut self, delta: isize) -> Option<&str> {
        let index = self.target(delta)?;
        self.current = Some(index);
        self.snapshots.get(index).map(String::as_str)
    }

    /// Push `snapshot` after the cursor.
    ///
    /// Returns `false` when it equals the snapshot under the cursor. Any
    /// redo branch is dropped first.
    pub fn add(&mut self, snapshot: String) -> bool {
        if self.current().is_some_and(|c| c == snapshot) {
            tracing::trace!(target: "trellis::undo", "snapshot unchanged, skipped");
            return false;
        }
        self.clear_redo();
        self.total_size += snapshot.chars().count();
        self.snapshots.push(snapshot);
        self.current = Some(self.snapshots.len() - 1);

        let mut evicted = 0;
        while evicted < self.snapshots.len() && self.total_size > self.max_size {
            self.total_size -= self.snapshots[evicted].chars().count();
            evicted += 1;
        }
        if evicted > 0 {
            self.snapshots.drain(..evicted);
            self.current = self.current.and_then(|c| c.checked_sub(evicted));
            tracing::debug!(
                target: "trellis::undo",
                evicted,
                total_size = self.total_size,
                "evicted oldest snapshots"
            );
        }
        true
    }

    /// Drop every snapshot after the cursor.
    pub fn clear_redo(&mut self) {
        let keep = self.current.map_or(0, |c| c + 1);
        if keep < self.snapshots.len() {
            let dropped: usize = self.snapshots[keep..]
                .iter()
                .map(|s| s.chars().count())
                .sum();
            self.snapshots.truncate(keep);
            self.total_size -= dropped;
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = None;
        self.total_size = 0;
    }
}
