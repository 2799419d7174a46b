mod feeders;
mod opener;
mod state;
mod styles;
mod tui;
mod view;

pub use feeders::spawn_tui_feeders;
pub use opener::{SystemOpener, UrlOpener};
pub use state::{AppState, Effect, Focus, Notice};
pub use tui::{TuiActor, TuiMsg};
