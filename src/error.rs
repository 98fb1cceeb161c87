use std::any::Any;
use std::error;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Error produced by a failing job.
///
/// A `JobError` is cheaply cloneable: the registry, the [`ErrorProbe`] and
/// the value returned from `wait` all share the same underlying error.
///
/// [`ErrorProbe`]: crate::ErrorProbe
#[derive(Clone)]
pub struct JobError(Arc<dyn error::Error + Send + Sync + 'static>);

impl JobError {
    /// Wrap a typed error.
    pub fn new<E>(err: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        JobError(Arc::new(err))
    }

    /// Build an error from a plain message.
    pub fn msg(msg: impl Into<String>) -> Self {
        JobError(Arc::new(Message(msg.into())))
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl error::Error for JobError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.0.source()
    }
}

impl From<String> for JobError {
    fn from(msg: String) -> Self {
        JobError::msg(msg)
    }
}

impl From<&str> for JobError {
    fn from(msg: &str) -> Self {
        JobError::msg(msg)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

// extract something printable from a catch_unwind payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
