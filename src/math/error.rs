// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors for arrays of angles that don't line up.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Cannot broadcast '{name}' with shape {shape:?} to shape {target:?}")]
    Broadcast {
        name: &'static str,
        shape: Vec<usize>,
        target: Vec<usize>,
    },

    #[error("'{a_name}' has shape {a_shape:?}, but '{b_name}' has shape {b_shape:?}; they must be the same")]
    Mismatch {
        a_name: &'static str,
        a_shape: Vec<usize>,
        b_name: &'static str,
        b_shape: Vec<usize>,
    },
}
