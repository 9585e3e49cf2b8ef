//! Charts module - chart descriptions and static PNG rendering

mod plotter;
mod renderer;

pub use plotter::ChartData;
pub use renderer::StaticChartRenderer;
