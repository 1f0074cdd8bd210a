//! Client library for the OpenTSDB HTTP query API.
//!
//! Queries are assembled from [`QuerySpec`]s inside a [`ClientConfig`],
//! which serializes to a single `/api/query` URL. [`Client`] sends that URL
//! (and the auxiliary endpoints) over HTTP; [`Datum`] and [`LineSocket`]
//! cover line-protocol ingestion.
//!
//! ```rust,no_run
//! use opentsdb_client::{Client, ClientConfig, QuerySpec};
//!
//! # async fn run() -> opentsdb_client::ClientResult<()> {
//! let mut query = QuerySpec::new_metric();
//! query.set_metric("cpu.utilization")?.set_tag("host", "*")?;
//!
//! let mut config = ClientConfig::new();
//! config.set_start("1h-ago")?.set_queries(vec![query])?;
//!
//! let data = Client::new(config)?.get().await?;
//! println!("{}", data);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod datum;
pub mod error;
pub mod query;
pub mod settings;
pub mod socket;
pub mod tags;
pub mod time;

pub use client::{Annotations, Client, ClientConfig, HttpGet, ReqwestTransport, UrlTemplate};
pub use datum::Datum;
pub use error::{ClientError, ClientResult};
pub use query::{QuerySpec, QueryTarget, RateOptions, RateOptionsUpdate, TsuidList};
pub use settings::Settings;
pub use socket::LineSocket;
pub use time::{RawTime, TimeFormat, TimeValue};
