//! Rectangle and point value types used throughout the crate.
//!
//! Window geometry is expressed in signed screen pixels. `Rect` is the
//! integer type the solvers work in; `RectF` is the float variant the motion
//! manager interpolates so sub-pixel progress is not lost between ticks.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sum of the absolute coordinate distances (taxicab metric).
    pub fn manhattan_length(self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in screen coordinates. `right`/`bottom` are
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn top_left(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn top_right(self) -> Point {
        Point::new(self.right(), self.y)
    }

    pub fn bottom_left(self) -> Point {
        Point::new(self.x, self.bottom())
    }

    pub fn bottom_right(self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Grows (or shrinks, for negative deltas) each edge outward.
    pub fn adjusted(self, dx1: i32, dy1: i32, dx2: i32, dy2: i32) -> Rect {
        Rect::new(
            self.x + dx1,
            self.y + dy1,
            self.width - dx1 + dx2,
            self.height - dy1 + dy2,
        )
    }

    pub fn translated(self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn united(self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn intersects(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn contains_rect(self, other: Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Width divided by height; callers guard against zero-sized windows.
    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn width_for_height(self, height: i32) -> i32 {
        (height as f64 * self.aspect_ratio()).round() as i32
    }

    pub fn height_for_width(self, width: i32) -> i32 {
        (width as f64 / self.aspect_ratio()).round() as i32
    }
}

/// Float rectangle used where sub-pixel precision matters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    pub fn center(self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn intersects(self, other: RectF) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(self, p: Point) -> bool {
        let (x, y) = (p.x as f64, p.y as f64);
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.width.round() as i32,
            self.height.round() as i32,
        )
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        RectF::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64)
    }
}
