//! Setup errors returned by `App::run`.

use thiserror::Error;

use crate::lifecycle::BoxError;

#[derive(Debug, Error)]
pub enum AppError {
    /// The caller-supplied extra gRPC service could not be registered.
    #[error("unable to start block reader: register extra grpc service: {0}")]
    RegisterGrpcService(#[source] BoxError),

    /// The side gRPC server could not be started.
    #[error("unable to start block reader: {0}")]
    GrpcServer(#[source] BoxError),

    /// A block reader is present but no usable gRPC address is configured.
    #[error("unable to start block reader: invalid grpc address {0:?}")]
    GrpcAddress(Option<String>),

    /// The watchdog is enabled but nothing can launch it.
    #[error("connection watchdog enabled but no watchdog launcher was provided")]
    MissingWatchdog,

    /// `run` was called again after an earlier run failed part-way through.
    #[error("app startup already failed, create a new app to retry")]
    StartupFailed,
}

pub type AppResult<T> = Result<T, AppError>;
