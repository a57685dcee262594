pub mod cli;
pub mod content;
pub mod mapping;

pub use cli::{Cli, Command};
pub use content::{
    ChapterContent, ChapterRef, ComicCard, ComicDetail, Genre, HomeFeed, Listing, Pagination,
};
pub use mapping::{EntityKind, MappingRecord};
