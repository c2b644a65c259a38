//! # Trellis Editor
//!
//! Core editing engine for the Trellis visual website builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: palette, canvas, property panel         │
//! └─────────────────────────────────────────────┘
//!                     ↓ operations, drag events
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor facade                       │
//! │  - Mutations with validation + inverses     │
//! │  - Undo/redo history                        │
//! │  - Drag-drop state machine                  │
//! │  - Diagnostics for rejected operations      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: pages, nodes, sibling order          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Store is source of truth**: rendered trees are derived views
//! 2. **Children lists own sibling order**: there is no separate position field
//! 3. **Rejected edits are no-ops**: nothing is partially applied
//! 4. **Responsive overrides are overlays**: base props stay desktop values
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trellis_editor::{Breakpoint, Editor, Props};
//!
//! let mut editor = Editor::new("my-site");
//! let page = editor.current_page().cloned().unwrap();
//!
//! let section = editor.add_node("Section", Props::new(), None, &page).unwrap();
//! let heading = editor.add_node("Heading", Props::new(), Some(&section), &page).unwrap();
//!
//! editor.set_breakpoint(Breakpoint::Mobile);
//! let props = editor.effective_props(&heading);
//!
//! editor.undo();
//! ```

mod config;
mod diagnostics;
mod drag;
mod editor;
mod errors;
mod ids;
mod mutations;
mod node;
mod ordering;
mod project;
mod registry;
mod responsive;
mod store;
mod undo_stack;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use drag::{resolve, DragController, DragSource, DragState, DropRegion, DropResolution, HoverState};
pub use editor::Editor;
pub use errors::{EditorError, LoadError};
pub use ids::{project_seed, IdGenerator, NodeId, PageId};
pub use mutations::Mutation;
pub use node::{Node, Page};
pub use project::{ProjectSnapshot, SNAPSHOT_VERSION};
pub use registry::{ComponentRegistry, ComponentSpec};
pub use responsive::{effective_props, merge_props, Breakpoint, Props, ResponsiveProps, UnknownBreakpoint};
pub use store::{EntityStore, RemovedPage, RemovedSubtree, StoreResult};
pub use undo_stack::{MutationBatch, UndoStack};
