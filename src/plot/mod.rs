//! Terminal plots.

pub mod ascii;

pub use ascii::{render_country_plots, render_series_plot};
