//! Planar feature geometry in map coordinates.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub points: Vec<Point>,
}

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            points: coords.iter().copied().map(Point::from).collect(),
        }
    }

    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// An exterior ring and its holes. Rings need not repeat the first vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub exterior: Vec<Point>,
    pub interiors: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point>, interiors: Vec<Vec<Point>>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    pub fn from_coords(exterior: &[(f64, f64)]) -> Self {
        Self {
            exterior: exterior.iter().copied().map(Point::from).collect(),
            interiors: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: &[(f64, f64)]) -> Self {
        self.interiors
            .push(hole.iter().copied().map(Point::from).collect());
        self
    }

    pub fn rings(&self) -> impl Iterator<Item = &Vec<Point>> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }
}

/// One feature's geometry collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub points: Vec<Point>,
    pub lines: Vec<LineString>,
    pub polygons: Vec<Polygon>,
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            points: vec![Point::new(x, y)],
            ..Self::default()
        }
    }

    pub fn line(line: LineString) -> Self {
        Self {
            lines: vec![line],
            ..Self::default()
        }
    }

    pub fn polygon(polygon: Polygon) -> Self {
        Self {
            polygons: vec![polygon],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.polygons.is_empty()
    }
}
