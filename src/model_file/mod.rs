// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Model files.

A model file is a small TOML document with a free-form `header` table of
strings and a `params` table of parameter values:

```toml
[header]
date = "2024-01-01"
antenna = "m000"

[params]
P1 = -0.5
P7 = 0.0123
```

Angles are in degrees. Only active (non-zero) parameters are written, and
parameters missing from a file are zero. A parameter the model doesn't know
about is an error.
 */

mod error;

pub use error::ModelFileError;

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::pointing::ParamInfo;

/// The free-form header of a model file.
pub type Header = IndexMap<String, String>;

/// A model with a fixed set of named parameters that can be stored in a model
/// file.
pub trait Model {
    /// A human-friendly name for this kind of model, e.g. "PointingModel".
    fn name(&self) -> &'static str;

    /// Information on all parameters of the model, in order.
    fn param_info(&self) -> &'static [ParamInfo];

    /// The values of all parameters. Angles are in radians.
    fn param_values(&self) -> Vec<f64>;

    /// Replace the values of all parameters. `values` has exactly as many
    /// elements as [`Model::param_info`].
    fn set_param_values(&mut self, values: &[f64]);
}

/// The contents of a model file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub header: Header,

    /// Parameter values, keyed by name. Angles are in degrees.
    pub params: IndexMap<String, f64>,
}

impl ModelFile {
    /// Get the contents of a model file for a model. Only its active
    /// parameters are included.
    pub fn from_model<M: Model + ?Sized>(model: &M, header: Header) -> ModelFile {
        let params = model
            .param_info()
            .iter()
            .zip(model.param_values())
            .filter(|(_, value)| *value != 0.0)
            .map(|(info, value)| {
                let value = if info.is_angle() {
                    value.to_degrees()
                } else {
                    value
                };
                (info.name.to_string(), value)
            })
            .collect();
        ModelFile { header, params }
    }

    /// Get the values of all of a model's parameters from this file (angles in
    /// radians). If a parameter in the file isn't in the model, its name is
    /// returned as the error.
    fn param_values<M: Model + ?Sized>(&self, model: &M) -> Result<Vec<f64>, String> {
        let info = model.param_info();
        if let Some(unknown) = self
            .params
            .keys()
            .find(|name| !info.iter().any(|i| i.name == name.as_str()))
        {
            return Err(unknown.clone());
        }
        Ok(info
            .iter()
            .map(|i| {
                let value = self.params.get(i.name).copied().unwrap_or(0.0);
                if i.is_angle() {
                    value.to_radians()
                } else {
                    value
                }
            })
            .collect())
    }
}

/// Read a model file into `model`, returning the file's header. `source_name`
/// is used to describe where the file came from in errors. The model is only
/// changed if the whole file can be read.
pub fn read_model<M: Model + ?Sized, T: BufRead>(
    model: &mut M,
    buf: &mut T,
    source_name: &str,
) -> Result<Header, ModelFileError> {
    let mut contents = String::new();
    buf.read_to_string(&mut contents)?;
    let file: ModelFile = toml::from_str(&contents).map_err(|err| ModelFileError::Parse {
        model: model.name(),
        source_name: source_name.to_string(),
        err,
    })?;
    let values = file
        .param_values(model)
        .map_err(|param| ModelFileError::UnknownParam {
            model: model.name(),
            source_name: source_name.to_string(),
            param,
        })?;
    model.set_param_values(&values);
    debug!(
        "Read {} with {} active parameters from {source_name}",
        model.name(),
        file.params.values().filter(|&&v| v != 0.0).count()
    );
    Ok(file.header)
}

/// Write `model` and a header as a model file.
pub fn write_model<M: Model + ?Sized, T: Write>(
    model: &M,
    header: &Header,
    buf: &mut T,
) -> Result<(), ModelFileError> {
    let file = ModelFile::from_model(model, header.clone());
    let contents = toml::to_string(&file)?;
    buf.write_all(contents.as_bytes())?;
    buf.flush()?;
    Ok(())
}

/// Read a model file at `path` into `model`, returning the file's header.
pub fn load_model<M: Model + ?Sized, P: AsRef<Path>>(
    model: &mut M,
    path: P,
) -> Result<Header, ModelFileError> {
    let path = path.as_ref();
    let mut buf = BufReader::new(File::open(path)?);
    read_model(model, &mut buf, &format!("file '{}'", path.display()))
}

/// Write `model` and a header to a model file at `path`.
pub fn save_model<M: Model + ?Sized, P: AsRef<Path>>(
    model: &M,
    header: &Header,
    path: P,
) -> Result<(), ModelFileError> {
    let mut buf = BufWriter::new(File::create(path)?);
    write_model(model, header, &mut buf)
}
