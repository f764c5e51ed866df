pub mod constants;
pub mod logger;

pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod pool;
pub mod utils;

pub use batch::{compress_task, run_batch, run_batch_with, BatchSummary, CompressStats};
pub use codec::{Codec, ImageCodec, ImageKind};
pub use config::Config;
pub use discovery::{discover, discover_with, is_candidate, Task};
pub use error::{Result, ShrinkError};
pub use output::OutputResolver;
pub use pool::{BatchOutcome, TaskOutcome, WorkerPool};
