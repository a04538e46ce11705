//! Agents: the protagonist and the patrolling enemies. Plain data holders
//! mutated by the per-step simulation; created at environment setup and alive
//! for the whole game.

use chon_core::geom::Aabb;
use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub aabb: Aabb,
    /// Movement speed in pixels per second.
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    /// Horizontal patrol direction, +1 (right) or -1 (left).
    patrol_dir: f32,
}

impl Agent {
    pub fn new(x: f32, y: f32, w: f32, h: f32, speed: f32, max_health: i32) -> Self {
        Self {
            aabb: Aabb::new(x, y, w, h),
            speed,
            health: max_health,
            max_health,
            patrol_dir: -1.0,
        }
    }

    /// Applies a directional movement intent. Components are expected in
    /// `[-1, 1]`; diagonal intent moves both axes at full speed, matching the
    /// per-key movement of the original game.
    pub fn move_by(&mut self, intent: Vec2, dt: f32) {
        self.aabb.pos += intent * self.speed * dt;
    }

    /// Scripted back-and-forth sweep between `min_x` and `max_x` (limits on
    /// the left edge of the box). Reverses direction at either limit.
    pub fn patrol(&mut self, min_x: f32, max_x: f32, dt: f32) {
        self.aabb.pos.x += self.patrol_dir * self.speed * dt;
        if self.aabb.pos.x <= min_x {
            self.aabb.pos.x = min_x;
            self.patrol_dir = 1.0;
        } else if self.aabb.pos.x >= max_x {
            self.aabb.pos.x = max_x;
            self.patrol_dir = -1.0;
        }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_by_scales_with_speed_and_dt() {
        let mut agent = Agent::new(100.0, 100.0, 160.0, 150.0, 180.0, 1000);
        agent.move_by(Vec2::new(1.0, 0.0), 1.0 / 60.0);
        assert!((agent.aabb.pos.x - 103.0).abs() < 1e-4);
        assert_eq!(agent.aabb.pos.y, 100.0);
    }

    #[test]
    fn patrol_reverses_at_limits_and_stays_within() {
        let mut agent = Agent::new(60.0, 20.0, 160.0, 150.0, 120.0, 3);
        let dt = 1.0 / 60.0;
        for _ in 0..2000 {
            agent.patrol(50.0, 1070.0, dt);
            assert!(agent.aabb.pos.x >= 50.0);
            assert!(agent.aabb.pos.x <= 1070.0);
        }
    }

    #[test]
    fn patrol_direction_flips_at_left_limit() {
        let mut agent = Agent::new(51.0, 20.0, 160.0, 150.0, 120.0, 3);
        let dt = 1.0 / 60.0;
        agent.patrol(50.0, 1070.0, dt);
        assert_eq!(agent.aabb.pos.x, 50.0);
        // Next step must move right.
        agent.patrol(50.0, 1070.0, dt);
        assert!(agent.aabb.pos.x > 50.0);
    }

    #[test]
    fn damage_saturates_at_zero() {
        let mut agent = Agent::new(0.0, 0.0, 10.0, 10.0, 0.0, 100);
        agent.take_damage(40);
        assert_eq!(agent.health, 60);
        assert!(!agent.is_dead());
        agent.take_damage(1000);
        assert_eq!(agent.health, 0);
        assert!(agent.is_dead());
    }
}
