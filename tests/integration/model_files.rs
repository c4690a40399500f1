// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests for saving and loading pointing models.

use std::fs::read_to_string;

use indoc::indoc;
use tempfile::TempDir;

use crate::*;
use antenna_pointing::{load_model, save_model, Header, PointingError, PointingModel};

#[test]
fn test_save_then_load_pointing_model() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = tmp_dir.path().join("m000.toml");

    let pm = typical_pointing_model();
    let mut header = Header::new();
    header.insert("antenna".to_string(), "m000".to_string());
    header.insert("date".to_string(), "2024-03-01".to_string());
    save_model(&pm, &header, &path).unwrap();

    // P2 is zero, so it isn't written.
    let contents = read_to_string(&path).unwrap();
    assert!(contents.contains("P1 = "), "{contents}");
    assert!(!contents.contains("P2 ="), "{contents}");

    let mut pm2 = PointingModel::new();
    let header2 = load_model(&mut pm2, &path).unwrap();
    assert_eq!(header2, header);
    assert_eq!(pm2, pm);
    assert_eq!(pm2.description(), pm.description());
}

#[test]
fn test_load_hand_written_model() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = tmp_dir.path().join("hand_written.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            [params]
            P1 = 0.1
            P9 = 0.002
        "#},
    )
    .unwrap();

    let mut pm = PointingModel::new();
    let header = load_model(&mut pm, &path).unwrap();
    assert!(header.is_empty());
    let mut expected = vec!["0"; 22];
    expected[0] = "0.1";
    expected[8] = "0.002";
    assert_eq!(pm.description(), expected.join(", "));
}

#[test]
fn test_load_bad_model() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = tmp_dir.path().join("bad.toml");
    std::fs::write(&path, "[params]\nP99 = 1.0\n").unwrap();

    fn load(path: &std::path::Path) -> Result<PointingModel, PointingError> {
        let mut pm = PointingModel::new();
        load_model(&mut pm, path)?;
        Ok(pm)
    }
    let result = load(&path);
    assert!(matches!(result, Err(PointingError::ModelFile(_))));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("P99"), "{err}");
}
