pub mod cancel;
pub mod chain;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod protocol;
pub mod testing;

pub use cancel::{CancelHandle, CancelToken};
pub use chain::{ChainExecutor, ChainOutcome, FilterIndex, OutcomeKind};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, FilterConfig,
};
pub use filter::{FilterError, FilterRunner, FilterSpec, ProcessFilter};
pub use pipeline::{
    BatchSummary, PipelineConfig, PipelineController, PipelineProgress, PipelineStatus,
    PoolStatus,
};
pub use protocol::{decode, encode, CodecError, ProtocolVersion, Record};
