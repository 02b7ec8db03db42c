//! Write side of the pipeline: validate and normalize scraped listings, then
//! record retailers, products, and price-change history through a
//! [`basketiq_core::PriceStore`]. Also backfills synthetic history so new
//! products can be forecast.

pub mod backfill;
pub mod batch;
pub mod engine;
pub mod error;
pub mod feed;
pub mod sync;

pub use backfill::{
    backfill_price_history, validate_backfill_limit, BackfillReport, DEFAULT_BACKFILL_DAYS,
    DEFAULT_BACKFILL_LIMIT, MAX_BACKFILL_LIMIT,
};
pub use batch::{ingest_batch, BatchReport};
pub use engine::{process_scraped_product, IngestOutcome};
pub use error::{BackfillError, FeedError, IngestError};
pub use feed::{parse_listings, FeedClient};
pub use sync::{sync_retailers, RetailerSyncStatus, SyncStatus};
