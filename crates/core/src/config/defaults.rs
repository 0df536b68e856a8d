//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_STORAGE_PROVIDER: &str = "postgres";
pub(crate) const DEFAULT_POSTGRES_HOST: &str = "localhost";
pub(crate) const DEFAULT_POSTGRES_DATABASE: &str = "capstone";
pub(crate) const DEFAULT_POSTGRES_USER: &str = "capstone";
pub(crate) const DEFAULT_POSTGRES_PASSWORD: &str = "capstone";
pub(crate) const DEFAULT_INTERACTIONS_TABLE: &str = "movie_ratings_final";
pub(crate) const DEFAULT_TAGS_TABLE: &str = "movie_tags";
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "metrics";
pub(crate) const DEFAULT_MODEL_DIR: &str = "engines";

/// Users with fewer interactions than this are counted as having too little data
pub const DEFAULT_SUFFICIENCY_THRESHOLD: usize = 20;

pub(crate) fn default_storage_provider() -> String {
    DEFAULT_STORAGE_PROVIDER.to_string()
}

pub(crate) fn default_postgres_host() -> String {
    DEFAULT_POSTGRES_HOST.to_string()
}

pub(crate) fn default_postgres_port() -> u16 {
    5432
}

pub(crate) fn default_postgres_database() -> String {
    DEFAULT_POSTGRES_DATABASE.to_string()
}

pub(crate) fn default_postgres_user() -> String {
    DEFAULT_POSTGRES_USER.to_string()
}

pub(crate) fn default_postgres_password() -> String {
    DEFAULT_POSTGRES_PASSWORD.to_string()
}

pub(crate) fn default_interactions_table() -> String {
    DEFAULT_INTERACTIONS_TABLE.to_string()
}

// Held-out comparison data lives in the same table unless configured otherwise
pub(crate) fn default_ground_truth_table() -> String {
    DEFAULT_INTERACTIONS_TABLE.to_string()
}

pub(crate) fn default_tags_table() -> String {
    DEFAULT_TAGS_TABLE.to_string()
}

pub(crate) fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

pub(crate) fn default_model_dir() -> String {
    DEFAULT_MODEL_DIR.to_string()
}

pub(crate) fn default_sufficiency_threshold() -> usize {
    DEFAULT_SUFFICIENCY_THRESHOLD
}

pub(crate) fn default_show_progress() -> bool {
    true
}
