//! Interactive grid and construction-line snapping
//!
//! - `grid`: cursor-to-grid alignment with the auxiliary-axis override
//! - `construction`: snapping onto construction lines with a sticky
//!   active direction
//! - `helper`: the `GridHelper` facade tying grid state, view state and
//!   snap anchors together for interactive tools

pub mod construction;
pub mod grid;
pub mod helper;

pub use construction::{SnapLines, SnapQuery};
pub use grid::{align_to_grid, align_with_aux, GridDescriptor};
pub use helper::{GridClass, GridHelper, SnapConfig, SnapItem, SnapSource, ViewProvider};
