pub mod command;
pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod progress;
pub mod types;
pub mod urls;

pub use command::{CommandRequest, CommandRunner, TokioCommandRunner};
pub use config::{ConfigLoader, ConfigStore, ConfigValidator, PipelineSettings, StoredConfig};
pub use credentials::{authenticated_url, redact_url};
pub use error::AppError;
pub use git::GitManager;
pub use pipeline::{CancelFlag, OperationHandle, OperationRequest, Pipeline, WorkspaceLocks};
pub use progress::{
    ChannelReporter, MultiReporter, NoopReporter, ProgressEvent, ProgressReporter, TracingReporter,
};
pub use types::*;
pub use urls::{ci_status_url, releases_url, repository_page_url};
