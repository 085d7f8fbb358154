use std::fmt::Display;

use thiserror::Error;
use tracing_error::{ExtractSpanTrace, SpanTrace};

#[derive(Debug)]
pub struct SpannedErr<T> {
    pub err: T,
    pub span_trace: SpanTrace,
}

impl<T> SpannedErr<T> {
    pub fn capture(err: T) -> Self {
        SpannedErr {
            err,
            span_trace: SpanTrace::capture(),
        }
    }
}

pub trait SpannedExt<T, E> {
    fn with_span_trace(self) -> Result<T, SpannedErr<E>>;
}

impl<T, E> SpannedExt<T, E> for Result<T, E> {
    fn with_span_trace(self) -> Result<T, SpannedErr<E>> {
        self.map_err(SpannedErr::capture)
    }
}

impl<E> ExtractSpanTrace for SpannedErr<E> {
    fn span_trace(&self) -> Option<&SpanTrace> {
        Some(&self.span_trace)
    }
}

impl<T: Display> Display for SpannedErr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.err, f)
    }
}

impl<U: std::error::Error> std::error::Error for SpannedErr<U> {}

/// Failures turning caller input into something runnable: the job template
/// document or the override command line.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to deserialize job template: {0}")]
    TemplateYaml(#[from] serde_yaml::Error),

    #[error("Job template has no 'metadata.name'")]
    TemplateNameMissing,

    #[error("Job template has no pod spec at 'spec.template.spec'")]
    TemplatePodSpecMissing,

    #[error("Failed to parse command arguments: {0}")]
    Args(#[from] shell_words::ParseError),
}
