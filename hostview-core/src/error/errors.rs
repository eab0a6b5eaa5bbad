/*
 *     Copyright 2024 The Hostview Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::borrow::Cow;
use std::{error::Error as ErrorTrait, fmt};

// ErrorType is the category of a wrapped error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorType {
    ConfigError,
    ValidationError,
    ProviderError,
}

impl ErrorType {
    // as_str returns the name of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ConfigError => "ConfigError",
            ErrorType::ValidationError => "ValidationError",
            ErrorType::ProviderError => "ProviderError",
        }
    }
}

// ExternalError wraps an error raised by a dependency with a category and
// an optional context message.
#[derive(Debug)]
pub struct ExternalError {
    pub etype: ErrorType,
    pub cause: Option<Box<dyn ErrorTrait + Send + Sync>>,
    pub context: Option<Cow<'static, str>>,
}

impl ExternalError {
    // new returns a new ExternalError without cause and context.
    pub fn new(etype: ErrorType) -> Self {
        ExternalError {
            etype,
            cause: None,
            context: None,
        }
    }

    // with_context attaches a context message.
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    // with_cause attaches the underlying error.
    pub fn with_cause(mut self, cause: Box<dyn ErrorTrait + Send + Sync>) -> Self {
        self.cause = Some(cause);
        self
    }

    // chain_display writes the error and its causes, skipping the type name
    // when it repeats the previous one in the chain.
    fn chain_display(
        &self,
        previous: Option<&ExternalError>,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut separator = "";
        if previous.map(|p| p.etype != self.etype).unwrap_or(true) {
            write!(f, "{}", self.etype.as_str())?;
            separator = " ";
        }

        if let Some(context) = self.context.as_ref() {
            write!(f, "{}context: {}", separator, context)?;
            separator = " ";
        }

        match self.cause.as_ref() {
            Some(cause) => {
                write!(f, "{}cause: ", separator)?;
                match cause.downcast_ref::<ExternalError>() {
                    Some(inner) => inner.chain_display(Some(self), f),
                    None => write!(f, "{}", cause),
                }
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chain_display(None, f)
    }
}

impl ErrorTrait for ExternalError {}

// OrErr converts foreign errors in a Result into an ExternalError.
pub trait OrErr<T, E> {
    /// Wraps the error with the given [ErrorType], keeping it as the cause.
    fn or_err(self, et: ErrorType) -> Result<T, ExternalError>
    where
        E: Into<Box<dyn ErrorTrait + Send + Sync>>;

    /// Same as [OrErr::or_err] with an additional context message.
    fn or_context(
        self,
        et: ErrorType,
        context: impl Into<Cow<'static, str>>,
    ) -> Result<T, ExternalError>
    where
        E: Into<Box<dyn ErrorTrait + Send + Sync>>;
}

impl<T, E> OrErr<T, E> for Result<T, E> {
    fn or_err(self, et: ErrorType) -> Result<T, ExternalError>
    where
        E: Into<Box<dyn ErrorTrait + Send + Sync>>,
    {
        self.map_err(|err| ExternalError::new(et).with_cause(err.into()))
    }

    fn or_context(
        self,
        et: ErrorType,
        context: impl Into<Cow<'static, str>>,
    ) -> Result<T, ExternalError>
    where
        E: Into<Box<dyn ErrorTrait + Send + Sync>>,
    {
        self.map_err(|err| {
            ExternalError::new(et)
                .with_cause(err.into())
                .with_context(context)
        })
    }
}
