//! Flat-file cache of online lookups
//!
//! Keys are raw addresses with surrounding whitespace trimmed. The CSV form
//! (`address,district,thana`) is what users download and upload again; an
//! empty district or thana means the lookup did not find it.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use bdaddr_common::{CacheRecord, Resolution, UNRESOLVED_LABEL};

use crate::error::{EnrichError, Result};

const REQUIRED_COLUMNS: [&str; 3] = ["address", "district", "thana"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCache {
    records: BTreeMap<String, CacheRecord>,
}

impl AddressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, address: &str) -> Option<&CacheRecord> {
        self.records.get(address.trim())
    }

    /// Store a resolution. Blank addresses are ignored and `false` is returned.
    pub fn store(&mut self, address: &str, resolution: &Resolution) -> bool {
        let key = address.trim();
        if key.is_empty() {
            return false;
        }
        let record = CacheRecord {
            address: key.to_string(),
            district: resolution.district.clone().unwrap_or_default(),
            thana: resolution.thana.clone().unwrap_or_default(),
        };
        self.records.insert(record.address.clone(), record);
        true
    }

    /// Add every record of `other`, replacing entries with the same key
    pub fn merge(&mut self, other: AddressCache) {
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &CacheRecord> {
        self.records.values()
    }

    /// Read a cache CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let mut columns = [0usize; 3];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers.iter().position(|h| h == name).ok_or_else(|| {
                EnrichError::malformed("cache", format!("missing the '{name}' column"))
            })?;
        }
        let [address_col, district_col, thana_col] = columns;

        let mut cache = Self::new();
        for record in reader.records() {
            let record = record?;
            let field = |i: usize| {
                let value = record.get(i).unwrap_or_default();
                if value == UNRESOLVED_LABEL {
                    String::new()
                } else {
                    value.to_string()
                }
            };
            let resolution = Resolution::new(Some(field(district_col)), Some(field(thana_col)));
            cache.store(record.get(address_col).unwrap_or_default(), &resolution);
        }

        debug!(entries = cache.len(), "Read address cache");
        Ok(cache)
    }

    /// Write the cache as CSV, header included
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(REQUIRED_COLUMNS)?;
        for record in self.records.values() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.to_writer(&mut buffer)?;
        Ok(buffer)
    }

    /// Load from disk; a missing file is an empty cache
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => {
                let cache = Self::from_reader(file)?;
                info!(path = %path.display(), entries = cache.len(), "Loaded address cache");
                Ok(cache)
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cache file yet, starting empty");
                Ok(Self::new())
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Write to disk, replacing the file only once the new content is complete
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let staging = path.with_extension("csv.partial");
        self.to_writer(std::fs::File::create(&staging)?)?;
        std::fs::rename(&staging, path)?;

        info!(path = %path.display(), entries = self.len(), "Saved address cache");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_lookup_trims_keys() {
        let mut cache = AddressCache::new();
        assert!(cache.store("  House 3, Pahartali  ", &Resolution::complete("Chattogram", "Pahartali")));

        let record = cache.lookup("House 3, Pahartali").unwrap();
        assert_eq!(record.address, "House 3, Pahartali");
        assert_eq!(record.resolution(), Resolution::complete("Chattogram", "Pahartali"));
        assert!(cache.lookup(" House 3, Pahartali ").is_some());
    }

    #[test]
    fn test_blank_address_is_never_stored() {
        let mut cache = AddressCache::new();
        assert!(!cache.store("   ", &Resolution::district_only("Dhaka")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_partial_resolution_round_trips_as_empty_field() {
        let mut cache = AddressCache::new();
        cache.store("Tongi Bazar", &Resolution::district_only("Gazipur"));

        let csv = String::from_utf8(cache.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(csv, "address,district,thana\nTongi Bazar,Gazipur,\n");

        let reloaded = AddressCache::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(reloaded, cache);
        assert_eq!(reloaded.lookup("Tongi Bazar").unwrap().resolution().thana, None);
    }

    #[test]
    fn test_not_found_label_reads_as_unresolved() {
        let csv = "address,district,thana\nSomewhere,Dhaka,Not found\n";
        let cache = AddressCache::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            cache.lookup("Somewhere").unwrap().resolution(),
            Resolution::district_only("Dhaka")
        );
    }

    #[test]
    fn test_columns_in_any_order() {
        let csv = "Thana,Address,District\nMirpur,\"House 1, Mirpur\",Dhaka\n";
        let cache = AddressCache::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(cache.lookup("House 1, Mirpur").unwrap().district, "Dhaka");
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let err = AddressCache::from_reader("address,district\nx,Dhaka\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EnrichError::MalformedUpload { kind: "cache", .. }));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = AddressCache::new();
        base.store("a", &Resolution::district_only("Dhaka"));
        base.store("b", &Resolution::district_only("Feni"));

        let mut upload = AddressCache::new();
        upload.store("a", &Resolution::complete("Dhaka", "Gulshan"));

        base.merge(upload);
        assert_eq!(base.len(), 2);
        assert_eq!(base.lookup("a").unwrap().thana, "Gulshan");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AddressCache::load(dir.path().join("nope.csv")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache_geocode.csv");

        let mut cache = AddressCache::new();
        cache.store("Boalia, Rajshahi", &Resolution::complete("Rajshahi", "Boalia"));
        cache.save(&path).unwrap();

        assert_eq!(AddressCache::load(&path).unwrap(), cache);
        assert!(!path.with_extension("csv.partial").exists());
    }
}
