//! The unpack/extract pipeline: locate eval-packed script blocks in page
//! text, reverse the p.a.c.k.e.r transform, and pull m3u8 manifest links out
//! of whatever comes back. Everything in here is pure and synchronous, the
//! network side lives in the scrape service.

pub mod extractor;
pub mod locator;
pub mod slug;
pub mod unbaser;
pub mod unpacker;

pub use extractor::{SourceEntry, extract_links, extract_sources};
pub use locator::find_packed_scripts;
pub use slug::resolve_slug;
pub use unpacker::unpack;
