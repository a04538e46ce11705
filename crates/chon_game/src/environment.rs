//! The game environment: bounds, the protagonist, the patrolling agents, the
//! falling items, and the score. All operations are synchronous and run once
//! per fixed simulation step.

use crate::agent::Agent;
use crate::config::GameConfig;
use crate::item::FallingItem;

#[derive(Debug, Clone)]
pub struct Environment {
    pub width: f32,
    pub height: f32,
    pub ground_offset: f32,
    pub protagonist: Agent,
    pub agents: Vec<Agent>,
    pub items: Vec<FallingItem>,
    pub score: u32,
}

impl Environment {
    pub fn from_config(config: &GameConfig) -> Self {
        let p = &config.protagonist;
        let e = &config.enemy;
        let mut env = Self {
            width: config.world.width,
            height: config.world.height,
            ground_offset: config.world.ground_offset,
            protagonist: Agent::new(p.start_x, p.start_y, p.width, p.height, p.speed, p.max_health),
            agents: vec![Agent::new(
                e.start_x,
                e.start_y,
                e.width,
                e.height,
                e.speed,
                e.max_health,
            )],
            items: Vec::new(),
            score: 0,
        };
        // Authored start positions are not trusted to sit inside the world.
        env.check_borders();
        env
    }

    /// Clamps the protagonist into `[0, width-w] x [0, height-h]`. Every
    /// violated edge is corrected in the same call, so a corner overshoot
    /// cannot leave one axis out of bounds.
    pub fn check_borders(&mut self) {
        let aabb = &mut self.protagonist.aabb;
        aabb.pos.x = aabb.pos.x.clamp(0.0, (self.width - aabb.size.x).max(0.0));
        aabb.pos.y = aabb.pos.y.clamp(0.0, (self.height - aabb.size.y).max(0.0));
    }

    /// Pairwise overlap between each agent and the protagonist; every
    /// overlapping agent deals the fixed contact damage this step.
    pub fn detect_agent_collisions(&mut self, contact_damage: i32) {
        for agent in &self.agents {
            if self.protagonist.aabb.overlaps(&agent.aabb) {
                log::debug!(
                    "Agent contact at ({:.0}, {:.0})",
                    agent.aabb.pos.x,
                    agent.aabb.pos.y
                );
                self.protagonist.take_damage(contact_damage);
            }
        }
    }

    /// Scans falling items for protagonist overlap. First match only per
    /// step: a hazard deals `hazard_damage`, a collectible scores one point;
    /// either way the matched item is removed and the scan stops.
    pub fn detect_item_collisions(&mut self, hazard_damage: i32) {
        let hit = self
            .items
            .iter()
            .position(|item| self.protagonist.aabb.overlaps(&item.aabb));
        if let Some(index) = hit {
            let item = self.items.remove(index);
            if item.hazard {
                self.protagonist.take_damage(hazard_damage);
            } else {
                self.score += 1;
            }
        }
    }

    /// Removes items whose box has reached the bottom threshold. `retain`
    /// guarantees each such item is dropped exactly once.
    pub fn cleanup_items(&mut self) {
        let floor = self.height - self.ground_offset;
        self.items.retain(|item| item.aabb.bottom() < floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use glam::Vec2;

    fn test_env() -> Environment {
        Environment::from_config(&GameConfig::default())
    }

    fn place_protagonist(env: &mut Environment, x: f32, y: f32) {
        env.protagonist.aabb.pos = Vec2::new(x, y);
    }

    fn item_at(x: f32, y: f32, hazard: bool) -> FallingItem {
        FallingItem::new(x, y, 60.0, 120.0, hazard, "item".into())
    }

    #[test]
    fn borders_clamp_all_four_edges() {
        let mut env = test_env();
        let (world_w, world_h) = (env.width, env.height);
        let w = env.protagonist.aabb.size.x;
        let h = env.protagonist.aabb.size.y;

        place_protagonist(&mut env, -25.0, -40.0);
        env.check_borders();
        assert_eq!(env.protagonist.aabb.pos, Vec2::new(0.0, 0.0));

        place_protagonist(&mut env, world_w + 10.0, world_h + 10.0);
        env.check_borders();
        assert_eq!(
            env.protagonist.aabb.pos,
            Vec2::new(world_w - w, world_h - h)
        );
    }

    #[test]
    fn borders_corner_overshoot_fixes_both_axes_in_one_call() {
        // The original game clamped at most one edge per call; both axes
        // must be corrected together for the invariant to hold.
        let mut env = test_env();
        let world_h = env.height;
        place_protagonist(&mut env, -100.0, world_h + 100.0);
        env.check_borders();
        let aabb = env.protagonist.aabb;
        assert!(aabb.pos.x >= 0.0 && aabb.right() <= env.width);
        assert!(aabb.pos.y >= 0.0 && aabb.bottom() <= env.height);
    }

    #[test]
    fn agent_contact_deals_fixed_damage_per_overlap() {
        let mut env = test_env();
        let start_health = env.protagonist.health;
        env.agents[0].aabb = env.protagonist.aabb;
        env.detect_agent_collisions(10);
        assert_eq!(env.protagonist.health, start_health - 10);

        // No overlap, no damage.
        env.agents[0].aabb.pos.x = env.protagonist.aabb.right() + 10.0;
        env.detect_agent_collisions(10);
        assert_eq!(env.protagonist.health, start_health - 10);
    }

    #[test]
    fn hazard_collision_deals_large_damage_and_removes_item() {
        let mut env = test_env();
        let start_health = env.protagonist.health;
        let p = env.protagonist.aabb.pos;
        env.items.push(item_at(p.x, p.y, true));

        env.detect_item_collisions(1000);
        assert_eq!(env.protagonist.health, start_health - 1000);
        assert_eq!(env.score, 0);
        assert!(env.items.is_empty());
    }

    #[test]
    fn collectible_collision_scores_and_removes_exactly_one() {
        let mut env = test_env();
        let p = env.protagonist.aabb.pos;
        // Two overlapping collectibles: only the first match is consumed.
        env.items.push(item_at(p.x, p.y, false));
        env.items.push(item_at(p.x + 5.0, p.y, false));

        env.detect_item_collisions(1000);
        assert_eq!(env.score, 1);
        assert_eq!(env.items.len(), 1);
        assert_eq!(env.protagonist.health, env.protagonist.max_health);
    }

    #[test]
    fn first_match_only_even_when_hazard_follows_collectible() {
        let mut env = test_env();
        let p = env.protagonist.aabb.pos;
        env.items.push(item_at(p.x, p.y, false));
        env.items.push(item_at(p.x, p.y, true));

        env.detect_item_collisions(1000);
        // The hazard behind the collectible survives the step untouched.
        assert_eq!(env.score, 1);
        assert_eq!(env.items.len(), 1);
        assert!(env.items[0].hazard);
        assert_eq!(env.protagonist.health, env.protagonist.max_health);
    }

    #[test]
    fn cleanup_removes_grounded_items_exactly_once() {
        let mut env = test_env();
        let floor = env.height - env.ground_offset;
        env.items.push(item_at(10.0, floor - 61.0, true)); // above threshold
        env.items.push(item_at(90.0, floor - 30.0, true)); // box crosses threshold
        env.items.push(item_at(200.0, env.height + 5.0, false)); // far below

        env.cleanup_items();
        assert_eq!(env.items.len(), 1);
        assert_eq!(env.items[0].aabb.pos.x, 10.0);

        // A second pass is a no-op.
        env.cleanup_items();
        assert_eq!(env.items.len(), 1);
    }
}
