//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each mutation records its inverse before being applied
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original mutations
//! - New mutations clear the redo stack
//! - Batches group several mutations into one undo step
//! - A batch that fails halfway through undo or redo is rolled back, so the
//!   store is left as it was before the attempt
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let mut store = EntityStore::new("site");
//!
//! stack.apply(&mutation, &mut store)?;
//! stack.undo(&mut store)?;
//! stack.redo(&mut store)?;
//! ```

use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::store::{EntityStore, StoreResult};

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone, PartialEq)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// The inverse mutations (in reverse order for undo)
    pub inverses: Vec<Mutation>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        let description = Some(mutation.describe());
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description,
        }
    }

    fn empty() -> Self {
        Self {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }
}

/// Apply `steps` in order, reporting how many went through before a failure
fn apply_all(steps: &[Mutation], store: &mut EntityStore) -> Result<(), (usize, EditorError)> {
    for (done, step) in steps.iter().enumerate() {
        step.apply(store).map_err(|err| (done, err))?;
    }
    Ok(())
}

fn roll_back(steps: &[Mutation], store: &mut EntityStore) {
    if let Err((done, err)) = apply_all(steps, store) {
        tracing::error!(%err, done, "failed to roll back a partial batch");
    }
}

/// Undo/redo stack for the editor
#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Batch currently being built
    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    ///
    /// On error nothing is recorded and the store is untouched.
    pub fn apply(&mut self, mutation: &Mutation, store: &mut EntityStore) -> StoreResult<()> {
        let inverse = mutation.to_inverse(store)?;
        mutation.apply(store)?;
        tracing::debug!(mutation = mutation.name(), "applied");

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse);
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), inverse));
        }

        Ok(())
    }

    /// Start a batch of mutations (undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch::empty());
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Undo whatever the open batch has applied so far and discard it
    pub fn abort_batch(&mut self, store: &mut EntityStore) -> StoreResult<()> {
        if let Some(batch) = self.current_batch.take() {
            for inverse in &batch.inverses {
                inverse.apply(store)?;
            }
        }
        Ok(())
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch
    pub fn undo(&mut self, store: &mut EntityStore) -> StoreResult<bool> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        if let Err((done, err)) = apply_all(&batch.inverses, store) {
            // the first `done` inverses reverted the last `done` mutations
            let n = batch.mutations.len();
            roll_back(&batch.mutations[n - done..], store);
            self.undo_stack.push(batch);
            return Err(err);
        }

        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, store: &mut EntityStore) -> StoreResult<bool> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err((done, err)) = apply_all(&batch.mutations, store) {
            let n = batch.inverses.len();
            roll_back(&batch.inverses[n - done..], store);
            self.redo_stack.push(batch);
            return Err(err);
        }

        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
