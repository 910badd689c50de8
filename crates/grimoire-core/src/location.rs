//! Scene and region location lookup.
//!
//! The displayed location is the scene's navigation name (or its plain name),
//! refined by the region under the controlled token. Regions are unions of
//! rectangles, ellipses and polygons, optionally limited to an elevation
//! band. When regions overlap, the last matching region in scene order wins.

use geo::{Coord, Intersects, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Placeholder used when no scene is active.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Centre point and elevation of a token on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPosition {
    /// Canvas x coordinate of the token centre.
    pub x: f64,
    /// Canvas y coordinate of the token centre.
    pub y: f64,
    /// Token elevation.
    #[serde(default)]
    pub elevation: f64,
}

/// One shape contributing to a region's area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionShape {
    /// Axis-aligned rectangle anchored at its top-left corner.
    Rectangle {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// Axis-aligned ellipse given by centre and radii.
    Ellipse {
        /// Centre x.
        x: f64,
        /// Centre y.
        y: f64,
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// Closed polygon; the closing edge is implied.
    Polygon {
        /// Vertices as `[x, y]` pairs.
        points: Vec<[f64; 2]>,
    },
}

impl RegionShape {
    /// Whether the point lies inside or on the edge of this shape.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let point = Point::new(x, y);
        match self {
            Self::Rectangle {
                x: left,
                y: top,
                width,
                height,
            } => {
                if *width < 0.0 || *height < 0.0 {
                    return false;
                }
                let rect = Rect::new(
                    Coord { x: *left, y: *top },
                    Coord {
                        x: left + width,
                        y: top + height,
                    },
                );
                rect.intersects(&point)
            }
            Self::Ellipse {
                x: cx,
                y: cy,
                radius_x,
                radius_y,
            } => {
                if *radius_x <= 0.0 || *radius_y <= 0.0 {
                    return false;
                }
                let dx = (x - cx) / radius_x;
                let dy = (y - cy) / radius_y;
                dx.mul_add(dx, dy * dy) <= 1.0
            }
            Self::Polygon { points } => {
                if points.len() < 3 {
                    return false;
                }
                let polygon = Polygon::new(LineString::from(points.clone()), Vec::new());
                polygon.intersects(&point)
            }
        }
    }
}

/// Vertical extent of a region. Missing bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElevationRange {
    /// Lowest elevation included.
    #[serde(default)]
    pub bottom: Option<f64>,
    /// Highest elevation included.
    #[serde(default)]
    pub top: Option<f64>,
}

impl ElevationRange {
    /// Whether `elevation` falls inside the band (bounds inclusive).
    pub fn contains(&self, elevation: f64) -> bool {
        self.bottom.is_none_or(|bottom| elevation >= bottom)
            && self.top.is_none_or(|top| elevation <= top)
    }
}

/// A named area of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Name shown when a token stands inside the region.
    pub name: String,
    /// Shapes whose union forms the region.
    #[serde(default)]
    pub shapes: Vec<RegionShape>,
    /// Elevation band.
    #[serde(default)]
    pub elevation: ElevationRange,
}

impl Region {
    /// Whether the token stands inside this region.
    pub fn test_point(&self, token: &TokenPosition) -> bool {
        self.elevation.contains(token.elevation)
            && self.shapes.iter().any(|shape| shape.contains(token.x, token.y))
    }
}

/// The last region in `regions` containing `token`, if any.
pub fn region_at<'a>(regions: &'a [Region], token: &TokenPosition) -> Option<&'a Region> {
    regions.iter().rev().find(|region| region.test_point(token))
}

/// Resolve the displayed location name.
///
/// Precedence: region under the controlled token, then the scene's
/// navigation name, then the scene name, then [`UNKNOWN_LOCATION`].
pub fn resolve_location(
    nav_name: Option<&str>,
    scene_name: Option<&str>,
    token: Option<&TokenPosition>,
    regions: &[Region],
) -> String {
    if let Some(region) = token.and_then(|token| region_at(regions, token)) {
        return region.name.clone();
    }
    [nav_name, scene_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_owned()
}
