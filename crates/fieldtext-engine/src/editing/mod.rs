/*!
 * # Editing Core Module
 *
 * Field-aware editing over two synchronized views of one text.
 *
 * ## Architecture Overview
 *
 * ### 1. Two xi-rope Buffers
 * - The **physical** buffer holds the rendered text, each field expanded to its
 *   display text from the [`FieldCatalog`](crate::FieldCatalog)
 * - The **logical** buffer holds the same text with fields removed
 * - Both are edited through xi-rope **Deltas**, never rebuilt wholesale
 *
 * ### 2. One Field List
 * - Every placed field is a [`FieldSpan`](crate::FieldSpan) carrying its
 *   logical position *and* its physical span
 * - Edits shift the spans after the edit point in both coordinates at once
 *
 * ### 3. Command-Based Editing
 * - Edits can be issued as **Commands** (`Cmd` enum) through
 *   [`FieldDocument::apply`], which reports a [`Patch`]
 * - Positions are physical byte offsets; a position strictly inside a field,
 *   past the end, or inside a multi-byte character is refused
 * - A refused edit leaves the document untouched
 *
 * ### 4. Snapshots
 * - [`FieldDocument::export_all`] and [`FieldDocument::export_selection`]
 *   return independent [`LogicalDocument`](crate::LogicalDocument) copies
 *   for copy/paste and undo; [`FieldDocument::restore`] and
 *   [`FieldDocument::insert_fragment`] take them back
 *
 * ## Module Structure
 *
 * - **`document`**: `FieldDocument` with the mutation algorithms and lookups
 * - **`commands`**: `Cmd` enum and `apply`
 * - **`patch`**: Edit result metadata
 * - **`snapshot`**: Export and restore of logical snapshots
 * - **`invariants`**: Consistency check run after every edit in debug builds
 *
 * ## Usage Pattern
 *
 * ```rust
 * use fieldtext_engine::FieldCatalog;
 * use fieldtext_engine::editing::*;
 *
 * let catalog: FieldCatalog<u32> = [(1, "{Name}")].into_iter().collect();
 * let mut doc = FieldDocument::new(catalog);
 *
 * doc.apply(Cmd::InsertText { at: 0, text: "Hello ".to_string() }).unwrap();
 * let patch = doc.apply(Cmd::InsertField { at: 6, field_id: 1 }).unwrap();
 * assert_eq!(patch.caret, 12);
 *
 * assert_eq!(doc.physical_text(), "Hello {Name}");
 * assert_eq!(doc.logical_text(), "Hello ");
 *
 * let snapshot = doc.export_all();
 * assert_eq!(snapshot.fields[0].position, 6);
 * ```
 */

pub mod commands;
pub mod document;
pub mod invariants;
pub mod patch;
pub mod snapshot;

pub use commands::Cmd;
pub use document::{Bias, FieldDocument};
pub use patch::Patch;
