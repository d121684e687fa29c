//! Linked-view filtering, selection and density-overlay engine.
//!
//! Coordinates multiple visual views over one shared row table: compound
//! filters become a single visibility mask, selections made in any view are
//! mirrored into the others, and bursts of filter changes collapse into one
//! debounced kernel-density recompute.

pub mod config;
pub mod debounce;
pub mod density;
pub mod error;
pub mod filter;
pub mod hours;
pub mod kde;
pub mod selection;
pub mod session;
pub mod table;
pub mod view;
pub mod weekday;

pub use config::EngineConfig;
pub use debounce::{Clock, DebounceState, DebouncedRecomputer, SystemClock};
pub use density::{DensityOverlayManager, DensityOptions, DensityRequest, DensitySurface};
pub use error::{EngineError, Result};
pub use filter::{DayMetric, FilterRule, FilterSet};
pub use hours::{CLOSED_TOKEN, DayHours, HoursInterval, parse_day_hours, parse_interval};
pub use kde::{AxisRange, DensityGrid};
pub use selection::{SelectionBroker, ViewId};
pub use session::DashboardSession;
pub use table::{Row, RowId, RowStore, Value};
pub use view::{ArtifactId, ViewAdapter};
pub use weekday::Weekday;
