//! Pan/zoom mapping between model space and screen space.

use super::config::ViewportConfig;
use super::model::Point;

/// `screen = translate + model * scale`, applied to both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewportTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewportTransform {
	pub const IDENTITY: ViewportTransform = ViewportTransform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	pub fn to_screen(&self, model: Point) -> Point {
		Point::new(self.x + model.x * self.k, self.y + model.y * self.k)
	}

	pub fn to_model(&self, screen: Point) -> Point {
		Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}
}

fn valid_scale(k: f64) -> bool {
	k.is_finite() && k > 0.0
}

/// Current transform plus the bounds and canvas size it lives in.
#[derive(Clone, Debug)]
pub struct ViewportState {
	config: ViewportConfig,
	transform: ViewportTransform,
	width: f64,
	height: f64,
}

impl ViewportState {
	pub fn new(config: ViewportConfig, width: f64, height: f64) -> Self {
		Self {
			config: config.sanitized(),
			transform: ViewportTransform::IDENTITY,
			width,
			height,
		}
	}

	pub fn transform(&self) -> ViewportTransform {
		self.transform
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn to_screen(&self, model: Point) -> Point {
		self.transform.to_screen(model)
	}

	pub fn to_model(&self, screen: Point) -> Point {
		self.transform.to_model(screen)
	}

	fn clamp_scale(&self, k: f64) -> f64 {
		k.clamp(self.config.min_zoom, self.config.max_zoom)
	}

	/// Replace the whole transform at once. A non-positive or non-finite
	/// scale is rejected. An out-of-range scale is clamped around the canvas
	/// center, so whatever the requested transform shows there stays there.
	pub fn set_transform(&mut self, transform: ViewportTransform) -> bool {
		if !valid_scale(transform.k) || !transform.x.is_finite() || !transform.y.is_finite() {
			return false;
		}
		self.transform = transform;
		let k = self.clamp_scale(transform.k);
		if k != transform.k {
			self.zoom_at(self.center(), k);
		}
		true
	}

	fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Zoom to `scale` keeping the point under `focal` (screen space) in
	/// place. The scale is clamped first and the translation derived from
	/// the clamped value, so the focal point never drifts.
	pub fn zoom_at(&mut self, focal: Point, scale: f64) -> bool {
		if !valid_scale(scale) {
			return false;
		}
		let anchor = self.to_model(focal);
		let k = self.clamp_scale(scale);
		self.transform = ViewportTransform {
			x: focal.x - anchor.x * k,
			y: focal.y - anchor.y * k,
			k,
		};
		true
	}

	/// Multiply the current scale by `factor` around `focal`.
	pub fn zoom_by(&mut self, focal: Point, factor: f64) -> bool {
		self.zoom_at(focal, self.transform.k * factor)
	}

	/// One wheel notch: zoom out for positive deltas, in for negative ones.
	pub fn wheel(&mut self, focal: Point, delta_y: f64) -> bool {
		let step = self.config.wheel_zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		self.zoom_by(focal, factor)
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Record a new canvas size and return the change.
	pub fn resize(&mut self, width: f64, height: f64) -> (f64, f64) {
		let delta = (width - self.width, height - self.height);
		self.width = width;
		self.height = height;
		delta
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn viewport() -> ViewportState {
		ViewportState::new(ViewportConfig::default(), 800.0, 600.0)
	}

	fn close(a: Point, b: Point) -> bool {
		a.distance(b) < 1e-9
	}

	#[test]
	fn focal_point_stays_put_when_zooming() {
		let mut view = viewport();
		view.pan_by(30.0, -12.0);
		let focal = Point::new(250.0, 140.0);
		let under = view.to_model(focal);
		assert!(view.zoom_at(focal, 2.5));
		assert_eq!(view.transform().k, 2.5);
		assert!(close(view.to_screen(under), focal));
	}

	#[test]
	fn out_of_range_zoom_clamps_around_focal_point() {
		let mut view = viewport();
		let focal = Point::new(100.0, 100.0);
		let under = view.to_model(focal);
		assert!(view.zoom_at(focal, 50.0));
		assert_eq!(view.transform().k, 10.0);
		assert!(close(view.to_screen(under), focal));
		assert!(view.zoom_at(focal, 0.001));
		assert_eq!(view.transform().k, 0.1);
		assert!(close(view.to_screen(under), focal));
	}

	#[test]
	fn invalid_scale_keeps_previous_transform() {
		let mut view = viewport();
		view.zoom_at(Point::new(10.0, 10.0), 2.0);
		let before = view.transform();
		assert!(!view.zoom_at(Point::ZERO, 0.0));
		assert!(!view.zoom_at(Point::ZERO, -1.0));
		assert!(!view.zoom_at(Point::ZERO, f64::NAN));
		assert!(!view.set_transform(ViewportTransform { x: 0.0, y: 0.0, k: -2.0 }));
		assert_eq!(view.transform(), before);
	}

	#[test]
	fn wheel_steps_scale() {
		let mut view = viewport();
		view.wheel(Point::ZERO, -1.0);
		assert!((view.transform().k - 1.1).abs() < 1e-12);
		view.wheel(Point::ZERO, 1.0);
		assert!((view.transform().k - 1.0).abs() < 1e-12);
	}

	#[test]
	fn resize_reports_delta() {
		let mut view = viewport();
		assert_eq!(view.resize(1000.0, 500.0), (200.0, -100.0));
		assert_eq!(view.size(), (1000.0, 500.0));
	}

	#[test]
	fn reversed_bounds_clamp_without_panicking() {
		let config = ViewportConfig {
			min_zoom: 10.0,
			max_zoom: 0.05,
			..ViewportConfig::default()
		};
		let mut view = ViewportState::new(config, 800.0, 600.0);
		assert!(view.wheel(Point::new(1.0, 1.0), -1.0));
		assert_eq!(view.transform().k, 1.1);
		assert!(view.zoom_at(Point::ZERO, 50.0));
		assert_eq!(view.transform().k, 10.0);
		assert!(view.zoom_at(Point::ZERO, 0.0001));
		assert_eq!(view.transform().k, 0.05);
	}

	#[test]
	fn clamped_set_transform_keeps_canvas_center() {
		let mut view = viewport();
		let requested = ViewportTransform { x: 40.0, y: -20.0, k: 25.0 };
		let center = Point::new(400.0, 300.0);
		let under = requested.to_model(center);
		assert!(view.set_transform(requested));
		assert_eq!(view.transform().k, 10.0);
		assert!(close(view.to_screen(under), center));

		let in_range = ViewportTransform { x: 5.0, y: 6.0, k: 2.0 };
		assert!(view.set_transform(in_range));
		assert_eq!(view.transform(), in_range);
	}
}
