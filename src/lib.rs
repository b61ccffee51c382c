pub mod catalog;
pub mod config;
pub mod error;
pub mod notes;
pub mod pdf;
pub mod resolver;

pub use catalog::fetcher::{CatalogFetcher, HttpTransport, ListenerId, ReqwestTransport};
pub use catalog::scheduler::{CatalogScheduler, Clock, TokioClock};
pub use catalog::{Catalog, CatalogStore, Security, SecurityKind};
pub use config::{Config, DateFormat};
pub use error::{CatalogError, NoteError};
pub use notes::{Deal, DealType, NegotiationNote, NoteParser};
pub use resolver::{AssetResolver, ResolvedAsset, UnknownAsset};
