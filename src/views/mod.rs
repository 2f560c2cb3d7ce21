//! Read-only projections over the report store.
//!
//! Every projection is recomputed from a snapshot of the store on each
//! request. An empty store yields empty results, never an error.

pub mod gallery;
pub mod table;
pub mod trends;

pub use gallery::{gallery, zip_options, GalleryLayout, GalleryQuery, GalleryView, SortOrder, ZipFilter};
pub use table::{table, write_csv, TableRow, TABLE_COLUMNS};
pub use trends::{trends, TrendView, ZipTotal};
