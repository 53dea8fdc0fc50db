//! Reading and writing corpora and datasets.
//!
//! Everything is stored as list-of-list-of-string structures, either as
//! pretty JSON or as CBOR.

use std::{fs::File, io::{BufReader, BufWriter, Read, Write}, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::dataset::BagDataset;
use crate::error::Result;
use crate::Bag;

pub fn write_json<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_cbor<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_cbor::to_writer(writer, value)?;
    Ok(())
}

pub fn read_cbor<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_cbor::from_reader(reader)?)
}

/// Save a corpus as a JSON array of arrays
pub fn save_bags(bags: &[Bag], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&bags, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_bags(path: impl AsRef<Path>) -> Result<Vec<Bag>> {
    read_json(BufReader::new(File::open(path)?))
}

impl BagDataset {
    /// Write `train_bags.json`, `test_bags_x.json` and `test_bags_y.json`
    /// into `dir`
    pub fn save_json_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        save_bags(&self.train_bags, dir.join("train_bags.json"))?;
        save_bags(&self.test_bags_x, dir.join("test_bags_x.json"))?;
        save_bags(&self.test_bags_y, dir.join("test_bags_y.json"))?;
        Ok(())
    }

    pub fn load_json_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            train_bags: load_bags(dir.join("train_bags.json"))?,
            test_bags_x: load_bags(dir.join("test_bags_x.json"))?,
            test_bags_y: load_bags(dir.join("test_bags_y.json"))?,
        })
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}
