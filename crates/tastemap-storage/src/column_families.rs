//! Column family definitions for RocksDB.
//!
//! - restaurants: restaurant records keyed by id (default compaction)

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for restaurant records
pub const CF_RESTAURANTS: &str = "restaurants";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_RESTAURANTS];

/// Records are small JSON blobs rewritten in place on every reconciliation.
fn restaurants_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![ColumnFamilyDescriptor::new(
        CF_RESTAURANTS,
        restaurants_options(),
    )]
}
