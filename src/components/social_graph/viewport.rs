use kurbo::{Affine, Point, Vec2};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Uniform pan + zoom mapping world space onto the canvas.
///
/// `world = (screen - pan) / scale`. Only the interaction controller mutates
/// it; everything else reads.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	scale: f64,
	pan: Vec2,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			scale: 1.0,
			pan: Vec2::ZERO,
		}
	}
}

impl Viewport {
	pub fn scale(&self) -> f64 {
		self.scale
	}

	#[cfg(test)]
	pub fn pan(&self) -> Vec2 {
		self.pan
	}

	pub fn screen_to_world(&self, screen: Point) -> Point {
		((screen.to_vec2() - self.pan) / self.scale).to_point()
	}

	pub fn world_to_screen(&self, world: Point) -> Point {
		(world.to_vec2() * self.scale + self.pan).to_point()
	}

	/// World-to-screen transform, translate then scale.
	pub fn affine(&self) -> Affine {
		Affine::translate(self.pan) * Affine::scale(self.scale)
	}

	pub(super) fn pan_by(&mut self, delta: Vec2) {
		self.pan += delta;
	}

	/// Zoom one wheel notch toward `anchor`, keeping the world point under it fixed.
	pub(super) fn zoom_at(&mut self, anchor: Point, delta_y: f64) {
		let factor = if delta_y < 0.0 {
			ZOOM_IN_FACTOR
		} else if delta_y > 0.0 {
			ZOOM_OUT_FACTOR
		} else {
			return;
		};
		let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
		let ratio = new_scale / self.scale;
		let anchor = anchor.to_vec2();
		self.pan = anchor - (anchor - self.pan) * ratio;
		self.scale = new_scale;
	}

	#[cfg(test)]
	pub(crate) fn with(scale: f64, pan: Vec2) -> Self {
		Self {
			scale: scale.clamp(MIN_SCALE, MAX_SCALE),
			pan,
		}
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_abs_diff_eq;

	use super::*;

	#[test]
	fn screen_world_roundtrip() {
		for (scale, pan) in [
			(1.0, Vec2::ZERO),
			(0.1, Vec2::new(-300.0, 42.0)),
			(2.75, Vec2::new(13.5, -870.25)),
			(5.0, Vec2::new(1e4, 1e4)),
		] {
			let vp = Viewport::with(scale, pan);
			for p in [Point::ZERO, Point::new(799.0, 1.5), Point::new(-40.0, 612.3)] {
				let back = vp.world_to_screen(vp.screen_to_world(p));
				assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
				assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
			}
		}
	}

	#[test]
	fn affine_matches_world_to_screen() {
		let vp = Viewport::with(1.7, Vec2::new(20.0, -5.0));
		let world = Point::new(33.0, 44.0);
		let a = vp.affine() * world;
		let b = vp.world_to_screen(world);
		assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
		assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut vp = Viewport::with(1.3, Vec2::new(57.0, -21.0));
		let anchor = Point::new(412.0, 233.0);
		for delta in [-1.0, -1.0, 3.0, -120.0, 50.0] {
			let before = vp.screen_to_world(anchor);
			vp.zoom_at(anchor, delta);
			let after = vp.screen_to_world(anchor);
			assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-9);
			assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-9);
		}
	}

	#[test]
	fn zoom_direction_and_clamp() {
		let mut vp = Viewport::default();
		vp.zoom_at(Point::ZERO, -1.0);
		assert_abs_diff_eq!(vp.scale(), 1.1, epsilon = 1e-12);
		vp.zoom_at(Point::ZERO, 1.0);
		assert_abs_diff_eq!(vp.scale(), 0.99, epsilon = 1e-12);
		vp.zoom_at(Point::ZERO, 0.0);
		assert_abs_diff_eq!(vp.scale(), 0.99, epsilon = 1e-12);

		for _ in 0..100 {
			vp.zoom_at(Point::new(10.0, 10.0), -1.0);
		}
		assert_eq!(vp.scale(), MAX_SCALE);
		for _ in 0..100 {
			vp.zoom_at(Point::new(10.0, 10.0), 1.0);
		}
		assert_eq!(vp.scale(), MIN_SCALE);
	}

	#[test]
	fn clamped_zoom_still_anchors() {
		let mut vp = Viewport::with(4.9, Vec2::new(3.0, 4.0));
		let anchor = Point::new(100.0, 80.0);
		let before = vp.screen_to_world(anchor);
		vp.zoom_at(anchor, -1.0);
		assert_eq!(vp.scale(), MAX_SCALE);
		let after = vp.screen_to_world(anchor);
		assert_abs_diff_eq!(before.x, after.x, epsilon = 1e-9);
		assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-9);
	}
}
