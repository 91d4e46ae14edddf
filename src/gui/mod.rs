//! Desktop rendition built on iced's Elm Architecture.
//!
//! The whole page is one canvas: the layout tree is drawn box by box, with
//! card spotlights and the custom cursor on top. A thin status bar below it
//! carries the theme toggle and form feedback.

pub mod app;
pub mod canvas;
pub mod message;
pub mod theme;
