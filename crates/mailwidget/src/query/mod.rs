//! Query API for the list view
//!
//! The derivation pipeline turns the raw collection plus the list parameters
//! into the page the rendering layer shows. Everything here is pure.

mod params;
mod pipeline;

pub use params::{
    DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZES, Filter, ListParams, ParseParamError, SortDir, SortKey,
};
pub use pipeline::{
    BadgeCounts, DerivedPage, MailSummary, derive_page, filter_and_sort, total_pages,
};
