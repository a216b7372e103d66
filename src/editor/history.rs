/// A saved state plus the events recorded since the checkpoint before it.
#[derive(Debug, Clone)]
pub struct Checkpoint<T> {
    events: Vec<String>,
    state: T,
}

impl<T> Checkpoint<T> {
    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn state(&self) -> &T {
        &self.state
    }
}

/// Linear undo/redo history of checkpoints.
///
/// Checkpoints at or after `next_index` are vulnerable: they can be redone,
/// and adding a new checkpoint discards them.
#[derive(Debug, Clone)]
pub struct History<T> {
    checkpoints: Vec<Checkpoint<T>>,
    next_index: usize,
    events: Vec<String>,
    auto_add: bool,
    max_checkpoints: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            checkpoints: Vec::new(),
            next_index: 0,
            events: Vec::new(),
            auto_add: true,
            max_checkpoints: None,
        }
    }
}

impl<T: Clone> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of stored checkpoints. A bound of zero is treated
    /// as one.
    pub fn with_max_checkpoints(mut self, max: Option<usize>) -> Self {
        self.max_checkpoints = max.map(|max| max.max(1));
        self
    }

    /// Discards vulnerable checkpoints, then saves `state`. Returns the index
    /// of the new checkpoint.
    pub fn add_checkpoint(&mut self, state: T) -> usize {
        while self.has_vulnerable() {
            self.checkpoints.pop();
            log::info!("[history] discard [{}]", self.checkpoints.len());
        }

        self.checkpoints.push(Checkpoint {
            events: std::mem::take(&mut self.events),
            state,
        });
        log::info!("[history] add checkpoint [{}]", self.next_index);
        self.next_index += 1;

        self.drop_oldest(self.checkpoints.len());
        self.next_index - 1
    }

    /// Adds a checkpoint only when auto-add is enabled.
    pub fn auto_add(&mut self, state: impl FnOnce() -> T) -> Option<usize> {
        self.auto_add.then(|| self.add_checkpoint(state()))
    }

    /// Records an event for the next checkpoint. Empty descriptions are
    /// ignored.
    pub fn add_event(&mut self, description: impl Into<String>) {
        let description = description.into();
        if description.is_empty() {
            log::warn!("[history] ignoring event without a description");
            return;
        }
        log::info!("[history] {description}");
        self.events.push(description);
    }

    /// Steps back one checkpoint. When nothing is vulnerable, `current` is
    /// saved first so the step can be redone, and the oldest checkpoints are
    /// dropped to stay within the bound. The restored checkpoint is never
    /// dropped, so a history bounded to one checkpoint briefly holds two.
    /// Returns the state to restore, or `None` if there is nothing to undo.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let none_vulnerable = !self.has_vulnerable();
        if self.next_index > 1 || (none_vulnerable && self.next_index > 0) {
            if none_vulnerable {
                self.checkpoints.push(Checkpoint {
                    events: std::mem::take(&mut self.events),
                    state: current.clone(),
                });
                log::info!("[history] add checkpoint [{}]", self.next_index);
                self.drop_oldest(self.next_index - 1);
            } else {
                self.next_index -= 1;
            }
            let index = self.next_index - 1;
            self.events.clear();
            log::info!("[history] undo to [{index}]");
            self.checkpoints.get(index).map(|checkpoint| checkpoint.state.clone())
        } else {
            log::info!("[history] nothing to undo");
            None
        }
    }

    /// Drops the oldest checkpoints beyond the bound, at most `droppable`
    /// of them.
    fn drop_oldest(&mut self, droppable: usize) {
        let Some(max) = self.max_checkpoints else {
            return;
        };
        let excess = self.checkpoints.len().saturating_sub(max).min(droppable);
        if excess > 0 {
            self.checkpoints.drain(..excess);
            self.next_index -= excess;
            log::debug!("[history] dropped {excess} oldest checkpoints");
        }
    }

    pub fn redo(&mut self) -> Option<T> {
        let Some(next) = self.checkpoints.get(self.next_index) else {
            log::info!("[history] nothing to redo");
            return None;
        };
        let state = next.state.clone();
        self.events.clear();
        log::info!("[history] redo to [{}]", self.next_index);
        self.next_index += 1;
        Some(state)
    }

    pub fn redo_all(&mut self) -> Option<T> {
        if !self.has_vulnerable() {
            log::info!("[history] nothing to redo");
            return None;
        }
        let last = self.checkpoints.last()?.state.clone();
        self.events.clear();
        self.next_index = self.checkpoints.len();
        log::info!("[history] redo to [{}]", self.next_index - 1);
        Some(last)
    }

    pub fn clear(&mut self) {
        self.next_index = 0;
        self.checkpoints.clear();
        self.events.clear();
    }

    pub fn count_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn checkpoint(&self, index: usize) -> Option<&Checkpoint<T>> {
        self.checkpoints.get(index)
    }

    pub fn checkpoint_events(&self, index: usize) -> Option<&[String]> {
        self.checkpoint(index).map(Checkpoint::events)
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn has_vulnerable(&self) -> bool {
        self.checkpoints.len() > self.next_index
    }

    /// Events recorded since the latest checkpoint.
    pub fn list_recent_events(&self) -> &[String] {
        &self.events
    }

    pub fn is_auto_add(&self) -> bool {
        self.auto_add
    }

    pub fn set_auto_add(&mut self, enabled: bool) {
        self.auto_add = enabled;
    }
}
