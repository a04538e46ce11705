//! Falling items: transient hazards and collectibles spawned above the
//! screen, descending at constant speed until they hit the protagonist or the
//! bottom threshold.

use chon_core::geom::Aabb;

#[derive(Debug, Clone)]
pub struct FallingItem {
    pub aabb: Aabb,
    /// Fall speed in pixels per second.
    pub speed: f32,
    pub hazard: bool,
    /// Key into the engine's texture cache (an asset path).
    pub texture_key: String,
}

impl FallingItem {
    pub fn new(x: f32, y: f32, size: f32, speed: f32, hazard: bool, texture_key: String) -> Self {
        Self {
            aabb: Aabb::new(x, y, size, size),
            speed,
            hazard,
            texture_key,
        }
    }

    pub fn fall(&mut self, dt: f32) {
        self.aabb.pos.y += self.speed * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fall_advances_downward_by_speed_times_dt() {
        let mut item = FallingItem::new(100.0, -60.0, 60.0, 120.0, true, "bomb".into());
        item.fall(0.5);
        assert!((item.aabb.pos.y - 0.0).abs() < 1e-4);
        assert_eq!(item.aabb.pos.x, 100.0);
    }
}
