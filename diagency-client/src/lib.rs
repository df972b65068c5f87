//! HTTP client and wallet orchestration for diagency agents.
//!
//! This crate talks to a diagency agency over its REST API: it signs a user
//! in, assembles a [`Wallet`] from the agent's records, previews invitations,
//! and drives credential and verification exchanges.
//!
//! # Architecture
//!
//! - `rest`: authenticated JSON requests and response classification
//! - `api`: one accessor per agency resource
//! - `token`: OAuth password and refresh grants
//! - `processor`: invitation preview and processing
//! - `aggregator`: concurrent wallet construction
//! - `service`: credential and verification actions on an open wallet
//! - `config`: client configuration and the initialization descriptor
//! - `error`: error types
//!
//! # Examples
//!
//! ```rust,no_run
//! use diagency_client::{ClientConfig, WalletLogin, WalletProvider, WalletService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = WalletProvider::new(ClientConfig::default())?;
//!     let wallet = provider
//!         .initiate(&WalletLogin {
//!             descriptor: std::fs::read_to_string("agency.json")?,
//!             username: "alice".into(),
//!             password: "secret".into(),
//!         })
//!         .await?;
//!
//!     let service = WalletService::from_provider(&provider, wallet)?;
//!     let preview = service.preview("https://issuer.example/offer/1").await?;
//!     println!("{preview:?}");
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod processor;
pub mod rest;
pub mod service;
pub mod token;
pub mod wallet;


pub use aggregator::{WalletLogin, WalletProvider};
pub use api::AgencyApi;
pub use config::{ClientConfig, InitDescriptor};
pub use error::{Error, Result, WalletError};
pub use processor::InvitationProcessor;
pub use rest::{Reply, RestClient};
pub use service::{CredentialAction, VerificationAction, WalletService};
pub use token::{ClientCredentials, OAuthTokenProvider, TokenInfo, TokenProvider};
pub use wallet::Wallet;
