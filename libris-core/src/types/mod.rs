//! Library record types shared by filters and format readers

mod author;
mod book;
mod image;
mod model;
mod series;
mod tag;
mod uid;

pub use author::Author;
pub use book::{Book, AUTO_ENCODING};
pub use image::Image;
pub use model::{BookModel, Chapter};
pub use series::{Series, SeriesInfo};
pub use tag::Tag;
pub use uid::{Uid, SHA256_UID};
