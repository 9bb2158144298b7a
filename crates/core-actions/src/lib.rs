//! Source-view engine and action dispatcher.
//!
//! `SourceView` is the navigator: it composes the text buffer (`core-text`),
//! the per-line disassembly store and marker overlay (`core-state`), the row
//! index and viewport (`core-model`) and the syntax cache (`core-highlight`)
//! behind one query interface. `dispatch` applies presentation-level
//! `Action`s to it.
//!
//! Module map:
//! * `source_view` - construction, geometry queries, expand/collapse, reload
//! * `markers`     - marker overlay operations and per-row marker resolution
//! * `find`        - wrapping text search over display rows
//! * `pointer`     - expression under the pointer, gutter and text clicks
//! * `dispatcher`  - `Action` -> `SourceView` application

mod dispatcher;
mod find;
mod markers;
mod pointer;
mod source_view;

pub use core_text::search::{FindDirection, SearchHit};
pub use dispatcher::{Action, DispatchResult, MotionKind, dispatch};
pub use pointer::{GutterColumn, WordAtPoint};
pub use source_view::{MAX_TAB_WIDTH, SourceView, ViewSettings};
