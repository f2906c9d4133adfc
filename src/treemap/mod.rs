mod figure;
mod navigator;
mod squarify;

pub use figure::{hit_test, Tile, TreemapFigure, TreemapNode, ROOT_COLOR};
pub use navigator::{Level, NavigationState, TreemapNavigator};
pub use squarify::{squarify, LayoutRect};
