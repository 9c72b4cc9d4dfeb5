pub mod core;
pub mod storage;
pub mod query;

/*
┌──────────────────────────────────────────────────────────────────────────┐
│                          INKDB STRUCT ARCHITECTURE                       │
└──────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── CORE LAYER ──────────────────────────────┐
│                                                                          │
│  ┌────────────────────────────────────────────────────────────────────┐  │
│  │                         struct Database                            │  │
│  │ storage: Arc<Mutex<Box<dyn Storage>>> // One backend, all tables   │  │
│  │ tables: HashMap<String, Table>        // Created on first use      │  │
│  │ options: TableOptions                 // id_field, cache_size      │  │
│  └────────────────────────────────────────────────────────────────────┘  │
│                                   │                                      │
│  ┌────────────────────────────────▼───────────────────────────────────┐  │
│  │                          struct Table                              │  │
│  │ storage: StorageProxy                 // Per-table view            │  │
│  │ last_id: RecordId                     // Never reused until purge  │  │
│  │ query_cache: BoundedCache<PredicateKey, Vec<Record>>               │  │
│  └────────────────────────────────────────────────────────────────────┘  │
└──────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── QUERY LAYER ─────────────────────────────┐
│                                                                          │
│  Query ──field()/index()──► Query ──eq()/gt()/any()/...──► Predicate     │
│                                                                          │
│  ┌──────────────────────┐  ┌───────────────────────┐  ┌───────────────┐  │
│  │ struct Predicate     │  │ enum PredicateKey     │  │ enum Frozen   │  │
│  │ • node (evaluation)  │  │ • Field{op,path,opnd} │  │ • Seq / Map   │  │
│  │ • key  (identity)    │  │ • And/Or (sorted)     │  │ • Set         │  │
│  │ • & | !              │  │ • Not                 │  │ • scalars     │  │
│  └──────────────────────┘  └───────────────────────┘  └───────────────┘  │
└──────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── STORAGE LAYER ────────────────────────────┐
│                                                                          │
│  trait Storage { read, write, close }                                    │
│   ├── MemoryStorage                                                      │
│   ├── JsonStorage          // whole store as one JSON file               │
│   └── CachingStorage       // write-behind decorator over any Storage    │
└──────────────────────────────────────────────────────────────────────────┘
*/
