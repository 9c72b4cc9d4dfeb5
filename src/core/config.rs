use std::path::PathBuf;

/// Where the database keeps its tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Json {
        path: PathBuf,
        create_dirs: bool, // Create missing parent directories
        pretty: bool,      // Indented output
    },
}

/// Per-table settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub id_field: String,
    pub cache_size: usize, // Query cache capacity, 0 = unbounded
}

impl TableOptions {
    pub const DEFAULT_ID_FIELD: &'static str = "id";
    pub const DEFAULT_CACHE_SIZE: usize = 10;

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            id_field: Self::DEFAULT_ID_FIELD.to_string(),
            cache_size: Self::DEFAULT_CACHE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,

    // Wrap the backend in a write-behind cache flushing every N writes
    pub write_cache_size: Option<usize>,

    // Defaults for tables opened through Database::table()
    pub table: TableOptions,
}

impl Config {
    pub fn in_memory() -> Self {
        Config {
            storage: StorageBackend::Memory,
            ..Config::default()
        }
    }

    pub fn json(path: impl Into<PathBuf>) -> Self {
        Config {
            storage: StorageBackend::Json {
                path: path.into(),
                create_dirs: false,
                pretty: false,
            },
            ..Config::default()
        }
    }

    pub fn with_write_cache(mut self, size: usize) -> Self {
        self.write_cache_size = Some(size);
        self
    }

    pub fn with_table_options(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: StorageBackend::Json {
                path: PathBuf::from("./inkdb.json"),
                create_dirs: false,
                pretty: false,
            },
            write_cache_size: None,
            table: TableOptions::default(),
        }
    }
}
