#![doc = "gdrive-upload-core: core logic for the gdrive-upload action."]

//! Input validation, credential handling, secret masking and the upload flow.
//! The remote store and the CI runner are reached only through traits
//! ([`contract::DriveClient`], [`contract::Authenticator`],
//! [`actions::ActionRuntime`]), so everything here runs without a network.
//!
//! # Usage
//! Build an [`actions::GithubActions`] runtime and an authenticator, then call
//! [`upload::upload`].

pub mod actions;
pub mod contract;
pub mod credentials;
pub mod error;
pub mod inputs;
pub mod masking;
pub mod upload;

pub use error::UploadError;
