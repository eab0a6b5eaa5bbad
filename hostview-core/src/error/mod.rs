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

pub mod errors;

pub use errors::ErrorType;
pub use errors::ExternalError;
pub use errors::OrErr;

// HVError is the error for hostview.
#[derive(thiserror::Error, Debug)]
pub enum HVError {
    // IO is the error for IO operation.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    // ProviderUnavailable is the error when a metrics source returns nothing.
    #[error("provider {0} is unavailable")]
    ProviderUnavailable(String),

    // InvalidProcFile is the error when a procfs file can not be parsed.
    #[error("invalid proc file {0}")]
    InvalidProcFile(String),

    // Serialize is the error for serde_json.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    // ExternalError is the error for external error.
    #[error(transparent)]
    ExternalError(#[from] ExternalError),
}
