//! Short-link probing and redirect target inspection.
//!
//! - `redirects`: single-hop HEAD probe with redirects disabled
//! - `params`: classification of redirect targets and query parameter extraction

mod params;
mod redirects;

pub use params::{classify_target, GiftParams, LinkKind, ParamsError, VipParams};
pub use redirects::{LinkResolver, RedirectOutcome};
