use prost::Message;
use serde_derive::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::clock;
use crate::error::Error;
use crate::meta;

/// Leads the binary file, little-endian.
pub const PROTO_MAGIC_NUMBER: u32 = 0x5640_FD6E;

pub const CSV_HEADER: &str = "Timestamp,DetectedObjects,ViolatingObjects,EnvironmentScore,SourceID";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Proto,
    Csv,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Proto => "coded",
            Format::Csv => "csv",
        }
    }
}

pub struct ProtoWriter<W: Write> {
    out: W,
}

impl ProtoWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the magic number.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> ProtoWriter<W> {
    pub fn new(mut out: W) -> Result<Self, Error> {
        out.write_all(&PROTO_MAGIC_NUMBER.to_le_bytes())?;

        Ok(Self { out })
    }

    pub fn write(&mut self, batch: &meta::Batch) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(batch.encoded_len() + 10);
        batch.encode_length_delimited(&mut buf)?;
        self.out.write_all(&buf)?;

        Ok(())
    }

    pub fn finish(mut self) -> Result<W, Error> {
        self.out.flush()?;

        Ok(self.out)
    }
}

/// Reads back what [`ProtoWriter`] wrote.
pub struct ProtoReader {
    data: Vec<u8>,
    pos: usize,
}

impl ProtoReader {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Error> {
        let magic = data
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or(Error::BadMagic(0))?;

        if magic != PROTO_MAGIC_NUMBER {
            return Err(Error::BadMagic(magic));
        }

        Ok(Self { data, pos: 4 })
    }

    pub fn read_all(self) -> Result<Vec<meta::Batch>, Error> {
        self.collect()
    }
}

impl Iterator for ProtoReader {
    type Item = Result<meta::Batch, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = self.data.get(self.pos..).filter(|b| !b.is_empty())?;
        let before = buf.len();

        match meta::Batch::decode_length_delimited(&mut buf) {
            Ok(batch) => {
                self.pos += before - buf.len();
                Some(Ok(batch))
            }
            Err(err) => {
                self.pos = self.data.len();
                Some(Err(err.into()))
            }
        }
    }
}

/// One csv row for a frame, without the line terminator.
pub fn frame_to_csv(frame: &meta::Frame) -> String {
    format!(
        "{},{},{},{:.3},{}",
        clock::format_frame_time(frame),
        frame.people.len(),
        frame.violating(),
        frame.environment_score(),
        frame.source_id
    )
}

pub struct CsvWriter<W: Write> {
    out: W,
}

impl CsvWriter<BufWriter<File>> {
    /// Opens `path` for appending, writing the header if the file is empty.
    pub fn append(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;
        let mut out = BufWriter::new(file);

        if is_new {
            writeln!(out, "{}", CSV_HEADER)?;
        }

        Ok(Self { out })
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes every frame of `batch` and flushes.
    pub fn write(&mut self, batch: &meta::Batch) -> Result<(), Error> {
        for frame in &batch.frames {
            writeln!(self.out, "{}", frame_to_csv(frame))?;
        }
        self.out.flush()?;

        Ok(())
    }

    pub fn finish(mut self) -> Result<W, Error> {
        self.out.flush()?;

        Ok(self.out)
    }
}
