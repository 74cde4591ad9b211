#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::integer_division,
    clippy::min_ident_chars,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::similar_names,
    clippy::single_call_fn,
)]

pub mod audio;
pub mod delta;
pub mod notify;
pub mod scrape;
