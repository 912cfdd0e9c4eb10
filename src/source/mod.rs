use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::{self, Read},
    path::PathBuf,
};
use thiserror::Error;
use tracing::{trace, warn};
use zip::{ZipArchive, read::ZipFile};

mod config;
pub mod models;
pub use config::*;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Trip table is missing required column: {0}")]
    MissingColumn(String),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
}

#[derive(Default, Debug, Clone)]
pub enum StorageType {
    #[default]
    None,
    Csv(PathBuf),
    Zip(PathBuf),
}

#[derive(Default)]
pub struct TripSource {
    config: Config,
    storage: StorageType,
}

impl TripSource {
    pub fn new(config: self::Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_csv(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Csv(path);
        self
    }

    pub fn from_zip(mut self, path: PathBuf) -> Self {
        self.storage = StorageType::Zip(path);
        self
    }

    pub fn storage(&self) -> &StorageType {
        &self.storage
    }

    /// Streams every trip row that deserializes, together with its position
    /// among the data rows of the file. Malformed rows are skipped but still
    /// consume a position, so positions stay stable.
    pub fn stream_trips<F>(&self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, SourceTrip)),
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Csv(path) => {
                let file = File::open(path)?;
                stream_from_reader::<SourceTrip, _, F>(file, self.config.delimiter, f)
            }
            StorageType::Zip(path) => {
                let zip_file = File::open(path)?;
                let mut archive = ZipArchive::new(zip_file)?;
                let file = get_file(&mut archive, &self.config.trips_file_name)?;
                stream_from_reader::<SourceTrip, _, F>(file, self.config.delimiter, f)
            }
        }
    }
}

fn stream_from_reader<T, R, F>(reader: R, delimiter: u8, mut f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    R: Read,
    F: FnMut((usize, T)),
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(self::Error::MissingColumn(missing.to_string()));
    }

    let mut skipped = 0;
    for (i, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(row) => f((i, row)),
            Err(err) => {
                trace!("Skipping row {i}: {err}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} malformed trip rows");
    }
    Ok(())
}

fn get_file<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, self::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(self::Error::FileNotFound(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}
