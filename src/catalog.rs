//! Reference type catalogue
//!
//! A native Rust transcription of the canonical fixture header
//! (`tests/fixtures/complex_types.h`): the battery of type shapes the
//! analyzer is expected to classify, kept as live data structures so the
//! two views of the catalogue never drift apart. These are passive
//! aggregates; the handful of methods are thin container mutations and
//! lookups with no validation layer on top.
//!
//! Ownership follows the C++ fixture's documented split: `owner`,
//! `location`, and the waypoints are owned outright; `db_connection` is a
//! non-owning handle whose target belongs to an external pool;
//! `network_config` is shared and `last_modifier` weakly referenced.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

/// Task priority, ordered from least to most urgent
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

/// Coarse lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Inactive,
    Active,
    Pending,
    Completed,
}

/// A point in 3-space; plain value type
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// User record, immutable after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    username: String,
    user_id: i32,
    is_admin: bool,
}

impl UserInfo {
    pub fn new(username: impl Into<String>, user_id: i32, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            user_id,
            is_admin,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Generic growable buffer; growth is delegated to the backing `Vec`
#[derive(Debug, Clone, Default)]
pub struct Buffer<T> {
    items: Vec<T>,
}

impl<T> Buffer<T> {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(initial_capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Opaque connection handle owned by an external pool
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnection {
    pub connection_string: String,
}

/// Credentials and certificate material for a network endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authentication {
    pub username: String,
    pub password: String,
    pub certificates: Vec<String>,
    pub two_factor_enabled: bool,
}

/// Per-operation network timeouts, in seconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Timeouts {
    pub connection_timeout: i32,
    pub read_timeout: i32,
    pub write_timeout: i32,
}

/// Endpoint configuration; inert data, never wired to live sockets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    pub allowed_ips: Vec<String>,
    pub auth: Authentication,
    pub timeouts: Timeouts,
}

/// Group name → shared member records
pub type UserGroupMap = BTreeMap<String, Vec<Rc<UserInfo>>>;

/// The central aggregate: one field per type shape the analyzer handles.
///
/// `users` and `user_registry` are deliberately independent collections;
/// `add_user` never registers, and `has_user` never consults `users`.
#[derive(Debug)]
pub struct ComplexDataStructure {
    // Basic scalars
    pub id: i32,
    pub weight: f64,
    pub is_active: bool,
    pub status_code: char,

    // Fixed at construction
    name: String,
    max_connections: i32,

    // Owned and referenced records
    pub owner: Option<Box<UserInfo>>,
    pub location: Option<Box<Point3D>>,
    /// Non-owning: the connection pool owns the target
    pub db_connection: Weak<DatabaseConnection>,
    pub network_config: Option<Rc<NetworkConfig>>,
    pub int_buffer: Option<Box<Buffer<i32>>>,
    pub last_modifier: Weak<UserInfo>,

    // Fixed-size arrays
    pub fixed_array: [i32; 10],
    pub coordinates: [f64; 3],
    pub buffer: [u8; 256],
    pub measurements: [f32; 5],
    pub tags: [String; 3],

    // Sequences
    pub users: Vec<UserInfo>,
    pub waypoints: Vec<Box<Point3D>>,
    pub log_messages: VecDeque<String>,
    pub db_pool: Vec<Rc<DatabaseConnection>>,

    // Associative collections
    pub string_to_int_map: BTreeMap<String, i32>,
    pub user_registry: BTreeMap<i32, Rc<UserInfo>>,
    pub metrics: HashMap<String, f64>,
    /// Multi-valued: duplicate priorities keep every entry
    pub priority_tasks: BTreeMap<Priority, Vec<String>>,

    // Sets
    pub unique_ids: BTreeSet<i32>,
    pub keywords: HashSet<String>,

    // Nested collections
    pub matrix: Vec<Vec<i32>>,
    pub named_paths: BTreeMap<String, Vec<Point3D>>,
    pub nested_metrics: HashMap<i32, BTreeMap<String, f64>>,

    // State
    pub current_priority: Priority,
    pub current_status: Status,

    // Callback slots
    pub callback_function: Option<fn(i32, f64) -> i32>,
    pub error_handler: Option<fn(&str)>,

    pub user_groups: UserGroupMap,
    pub network_settings: NetworkConfig,
}

// Not derived: `Default` is not implemented for [u8; 256]
impl Default for ComplexDataStructure {
    fn default() -> Self {
        Self {
            id: 0,
            weight: 0.0,
            is_active: false,
            status_code: '\0',
            name: String::new(),
            max_connections: 0,
            owner: None,
            location: None,
            db_connection: Weak::new(),
            network_config: None,
            int_buffer: None,
            last_modifier: Weak::new(),
            fixed_array: [0; 10],
            coordinates: [0.0; 3],
            buffer: [0; 256],
            measurements: [0.0; 5],
            tags: Default::default(),
            users: Vec::new(),
            waypoints: Vec::new(),
            log_messages: VecDeque::new(),
            db_pool: Vec::new(),
            string_to_int_map: BTreeMap::new(),
            user_registry: BTreeMap::new(),
            metrics: HashMap::new(),
            priority_tasks: BTreeMap::new(),
            unique_ids: BTreeSet::new(),
            keywords: HashSet::new(),
            matrix: Vec::new(),
            named_paths: BTreeMap::new(),
            nested_metrics: HashMap::new(),
            current_priority: Priority::default(),
            current_status: Status::default(),
            callback_function: None,
            error_handler: None,
            user_groups: UserGroupMap::new(),
            network_settings: NetworkConfig::default(),
        }
    }
}

impl ComplexDataStructure {
    pub fn new(name: impl Into<String>, max_connections: i32) -> Self {
        let mut fixed_array = [0i32; 10];
        for (i, slot) in fixed_array.iter_mut().enumerate() {
            *slot = i as i32;
        }

        Self {
            status_code: 'I',
            name: name.into(),
            max_connections,
            fixed_array,
            users: Vec::with_capacity(100),
            waypoints: Vec::with_capacity(50),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_connections(&self) -> i32 {
        self.max_connections
    }

    /// Append a user record; no deduplication, no registry update
    pub fn add_user(&mut self, user: UserInfo) {
        self.users.push(user);
    }

    /// Allocate a new waypoint owned by this structure
    pub fn add_waypoint(&mut self, x: f64, y: f64, z: f64) {
        self.waypoints.push(Box::new(Point3D::new(x, y, z)));
    }

    /// Upsert a named metric
    pub fn set_metric(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    /// Metric lookup; absent keys read as `0.0` rather than signaling
    pub fn get_metric(&self, key: &str) -> f64 {
        self.metrics.get(key).copied().unwrap_or(0.0)
    }

    /// Queue a task; duplicate priorities are preserved in insertion order
    pub fn add_task(&mut self, priority: Priority, task: impl Into<String>) {
        self.priority_tasks
            .entry(priority)
            .or_default()
            .push(task.into());
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Membership test against the registry only; `add_user` does not
    /// populate it
    pub fn has_user(&self, user_id: i32) -> bool {
        self.user_registry.contains_key(&user_id)
    }
}

/// Replication behavior for a database endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicationConfig {
    pub enabled: bool,
    pub replica_hosts: Vec<String>,
    pub sync_interval: i32,
    pub replication_priority: Priority,
}

/// Database connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub connection_string: String,
    pub pool_size: i32,
    pub backup_hosts: Vec<String>,
    pub connection_params: BTreeMap<String, String>,
    pub replication: ReplicationConfig,
}

/// Cache sizing and policy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    pub max_memory_mb: u64,
    pub ttl_seconds: i32,
    pub cache_policies: HashMap<String, i32>,
    pub cache_partitions: Vec<(String, u64)>,
}

/// Log severity floor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

/// Log destination and rotation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub min_level: LogLevel,
    pub log_file_path: PathBuf,
    pub rotate_logs: bool,
    pub max_file_size_mb: u64,
    pub log_targets: Vec<String>,
}

/// Configuration tree: settings plus shared data collections and an
/// exclusively owned, potentially recursive set of sub-configurations
#[derive(Debug, Default)]
pub struct SystemConfiguration {
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
    pub data_collections: BTreeMap<String, Vec<Rc<ComplexDataStructure>>>,
    pub subsystems: HashMap<i32, Box<SystemConfiguration>>,
}

/// Process-wide holder for the fixture's formerly-global instances
#[derive(Debug, Default)]
pub struct StructurePool {
    pub main: Option<Box<ComplexDataStructure>>,
    pub pool: Vec<ComplexDataStructure>,
    pub configs: BTreeMap<i32, SystemConfiguration>,
}
