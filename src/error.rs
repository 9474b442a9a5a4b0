//! Error types for loading scenes

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scene: {message}")]
    Syntax { span: Option<Span>, message: String },

    #[error("Unknown box '{name}'")]
    UnknownBox { name: String, span: Option<Span> },

    #[error("Invalid scene: {message}")]
    Invalid { message: String, span: Option<Span> },
}

impl From<toml::de::Error> for SceneError {
    fn from(err: toml::de::Error) -> Self {
        SceneError::Syntax {
            span: err.span(),
            message: err.message().to_string(),
        }
    }
}

impl SceneError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SceneError::Invalid {
            message: message.into(),
            span: None,
        }
    }

    /// Attach the span of the first occurrence of `needle` in `source`,
    /// unless the error already has one
    pub fn locate(self, source: &str, needle: &str) -> Self {
        let found = || source.find(needle).map(|start| start..start + needle.len());
        match self {
            SceneError::UnknownBox { name, span: None } => SceneError::UnknownBox { name, span: found() },
            SceneError::Invalid { message, span: None } => SceneError::Invalid { message, span: found() },
            other => other,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            SceneError::IoError(_) => None,
            SceneError::Syntax { span, .. }
            | SceneError::UnknownBox { span, .. }
            | SceneError::Invalid { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("Error: {}", self);
        };
        let message = match self {
            SceneError::Syntax { message, .. } | SceneError::Invalid { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| format!("Error: {}", self)),
            Err(_) => format!("Error: {}", self),
        }
    }
}
