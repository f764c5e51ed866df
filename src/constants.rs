pub const DEFAULT_QUALITY: i64 = 60;
pub const MIN_QUALITY: i64 = 0;
pub const MAX_QUALITY: i64 = 100;

pub const DEFAULT_WORKERS: i64 = 50;
pub const DEFAULT_ROOT_DIR: &str = ".";

pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;
pub const PNG_ZOPFLI_QUALITY: u8 = 90;
pub const PNG_HIGH_QUALITY: u8 = 70;

// gif encoder speed range, 1 is slowest/best
pub const GIF_BEST_SPEED: i32 = 1;
pub const GIF_FASTEST_SPEED: i32 = 30;

pub const TEMP_FILE_PREFIX: &str = ".img-shrink-";
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";
pub const WORKER_THREAD_PREFIX: &str = "shrink-worker";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "ok";
pub const WARNING_PREFIX: &str = "⚠️";
