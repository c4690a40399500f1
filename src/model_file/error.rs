// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading and writing model files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelFileError {
    #[error("Could not construct {model} from {source_name}: unknown parameter '{param}'")]
    UnknownParam {
        model: &'static str,
        source_name: String,
        param: String,
    },

    #[error("Could not construct {model} from {source_name}: {err}")]
    Parse {
        model: &'static str,
        source_name: String,
        err: toml::de::Error,
    },

    #[error("Could not write model file: {0}")]
    Write(#[from] toml::ser::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
