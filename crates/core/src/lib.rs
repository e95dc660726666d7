pub mod config;
pub mod driver;
pub mod encode;
pub mod engine;
pub mod filter;
pub mod format;
pub mod media;
pub mod probe;
pub mod progress;
pub mod testing;
pub mod workspace;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, EncoderConfig, WorkspaceConfig,
};
pub use driver::{ExecutionFailure, FfmpegDriver, ProcessDriver};
pub use encode::{
    expand_passes, validate_pass_count, Arg, Command, EncodeError, EncodeJob, EncodeSummary,
    JobState, Pass,
};
pub use engine::Engine;
pub use filter::{
    AudioResampleFilter, ClipFilter, CodecFilter, CodecKind, ExtraParamsFilter, Filter,
    FilterPipeline, FrameRateFilter, RateControlFilter, ResizeFilter, SimpleFilter,
    ThreadsFilter,
};
pub use format::{
    EncodingFormat, Format, FormatCapabilities, FormatKind, FormatPreset, DEFAULT_VIDEO_TUNING,
};
pub use media::{Frame, TimeCode, TimeCodeError, Video, VideoFilters};
pub use probe::{FfprobeProbe, MediaInfo, Probe, ProbeError};
pub use progress::{
    DurationProgressListener, PassProgress, ProgressEvent, ProgressListener, ProgressParser,
};
pub use workspace::{FsWorkspace, Workspace, WorkspaceError};
