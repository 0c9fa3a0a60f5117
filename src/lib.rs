//! # trivia_ingest
//!
//! Ingests a trivia match from an archived episode page or a spreadsheet
//! template and normalizes both into one [`Match`] model.
//!
//! ## Pipeline
//!
//! 1. **Routing**: [`Resolver`] looks at the identifier. Short numeric ids
//!    are episode pages; long ids are spreadsheet keys.
//! 2. **Fetching**: episode pages come from the local cache, the snapshot
//!    archive, or the live site, in that order. Spreadsheets are exported
//!    as CSV in a single request.
//! 3. **Parsing**: [`sources::page`] walks the page markup and
//!    [`sources::sheet`] reads the template by cell position. Both produce
//!    [`models::RawRecords`].
//! 4. **Normalizing**: [`normalize::assemble`] validates the records and
//!    builds the [`Match`].
//!
//! ```ignore
//! let resolver = Resolver::new(&Config::default())?;
//! match resolver.resolve(&MatchId::new("6543")).await? {
//!     Ingested::Complete(game) => println!("{}", game.air_date),
//!     Ingested::Incomplete(why) => println!("{why}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod sources;
pub mod utils;

pub use config::Config;
pub use error::{Incomplete, IngestError, Ingested, Result, Tier};
pub use models::{Clue, FinalRound, Match, MatchId, Round, SourceKind};
pub use resolver::Resolver;
