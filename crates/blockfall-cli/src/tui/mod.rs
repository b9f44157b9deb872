//! Fixed-rate terminal runtime: ticks drive the game, renders happen only
//! after something changed.

mod app;
mod event;
mod event_loop;
mod runtime;

pub use self::{app::App, runtime::Runtime};
