//! Client-side navigation: URL routes, per-session state and the controller
//! that ties the mapping service, the content gateway and local storage
//! together.

pub mod controller;
pub mod route;
pub mod session;
pub mod view;


pub use controller::{Controller, FilterForm, Outcome};
pub use route::{looks_like_token, Location, Route};
pub use session::{ComicContext, Session};
pub use view::{DetailView, ListingView, PrimaryAction, ReaderView, View};
