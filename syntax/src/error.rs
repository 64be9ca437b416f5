//    This file is part of doctree.
//
//    doctree is free software: you can redistribute it and/or modify
//    it under the terms of the GNU General Public License as published by
//    the Free Software Foundation, either version 3 of the License, or
//    (at your option) any later version.
//
//    doctree is distributed in the hope that it will be useful,
//    but WITHOUT ANY WARRANTY; without even the implied warranty of
//    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//    GNU General Public License for more details.
//
//    You should have received a copy of the GNU General Public License
//    along with doctree.  If not, see <https://www.gnu.org/licenses/>.

use thiserror::Error;

/// Failures raised by the tree algebra (`crate::tree`). These always abort
/// the mutation before it touches the tree; they are never raised mid-edit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("anchor node is not attached to any parent")]
    NoSuchAnchor,

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("node handle is stale (removed or from a different tree)")]
    StaleHandle,
}

/// Failures raised by the incremental cache (`crate::cache`). Interruption
/// by the time budget is deliberately not part of this enum: it is a normal,
/// resumable outcome, represented by `SyncOutcome::Incomplete` instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("edit request queue references a position outside the buffer")]
    RequestOutOfBounds,

    #[error("synthetic key table is inconsistent with the ordered index")]
    KeyTableCorrupt,
}
