//! Time-gated probabilistic item spawner. A cooldown of simulated seconds
//! must elapse between spawns and the item population is capped. The RNG is
//! injected so tests can seed it and replay runs deterministically.

use crate::config::{SpawnerConfig, TextureConfig};
use crate::environment::Environment;
use crate::item::FallingItem;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct ItemSpawner {
    config: SpawnerConfig,
    hazard_texture: String,
    collectible_texture: String,
    cooldown: f32,
}

impl ItemSpawner {
    pub fn new(config: SpawnerConfig, textures: &TextureConfig) -> Self {
        Self {
            config,
            hazard_texture: textures.hazard.clone(),
            collectible_texture: textures.collectible.clone(),
            cooldown: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.cooldown = 0.0;
    }

    /// Advances the spawn cooldown by `dt` and spawns at most one item when
    /// the cooldown has elapsed and the population is below the cap.
    pub fn tick<R: Rng>(&mut self, env: &mut Environment, dt: f32, rng: &mut R) {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return;
        }
        if env.items.len() >= self.config.max_items {
            return;
        }

        let cfg = &self.config;
        let spawn_x = rng.gen_range(0.0..(env.width - cfg.spawn_margin));
        let hazard = rng.gen_bool(cfg.hazard_chance);
        let speed = if hazard && rng.gen_bool(cfg.fast_chance) {
            cfg.fall_speed_fast
        } else {
            cfg.fall_speed
        };
        let texture_key = if hazard {
            self.hazard_texture.clone()
        } else {
            self.collectible_texture.clone()
        };

        env.items.push(FallingItem::new(
            spawn_x,
            -cfg.item_size,
            cfg.item_size,
            speed,
            hazard,
            texture_key,
        ));
        self.cooldown = cfg.spawn_delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawner_and_env() -> (ItemSpawner, Environment) {
        let config = GameConfig::default();
        (
            ItemSpawner::new(config.spawner.clone(), &config.textures),
            Environment::from_config(&config),
        )
    }

    #[test]
    fn population_never_exceeds_cap() {
        let (mut spawner, mut env) = spawner_and_env();
        let mut rng = StdRng::seed_from_u64(7);
        // Far more ticks than the cap, with no pruning in between.
        for _ in 0..10_000 {
            spawner.tick(&mut env, 1.0, &mut rng);
            assert!(env.items.len() <= spawner.config.max_items);
        }
        assert_eq!(env.items.len(), spawner.config.max_items);
    }

    #[test]
    fn cooldown_gates_consecutive_spawns() {
        let (mut spawner, mut env) = spawner_and_env();
        let mut rng = StdRng::seed_from_u64(42);
        let dt = 1.0 / 60.0;

        spawner.tick(&mut env, dt, &mut rng);
        assert_eq!(env.items.len(), 1);

        // 0.35s of cooldown at 60 Hz is 21 steps; none of them may spawn.
        for _ in 0..20 {
            spawner.tick(&mut env, dt, &mut rng);
        }
        assert_eq!(env.items.len(), 1);

        spawner.tick(&mut env, dt, &mut rng);
        assert_eq!(env.items.len(), 2);
    }

    #[test]
    fn spawned_items_stay_within_horizontal_bounds() {
        let (mut spawner, mut env) = spawner_and_env();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            env.items.clear();
            spawner.reset();
            spawner.tick(&mut env, 1.0, &mut rng);
            let item = &env.items[0];
            assert!(item.aabb.pos.x >= 0.0);
            assert!(item.aabb.pos.x < env.width - 100.0);
            assert!(item.aabb.bottom() <= 0.0, "items spawn above the screen");
        }
    }

    #[test]
    fn spawns_both_kinds_and_only_configured_speeds() {
        let (mut spawner, mut env) = spawner_and_env();
        let mut rng = StdRng::seed_from_u64(1234);
        let mut hazards = 0usize;
        let mut collectibles = 0usize;
        let mut fast = 0usize;
        for _ in 0..500 {
            env.items.clear();
            spawner.reset();
            spawner.tick(&mut env, 1.0, &mut rng);
            let item = &env.items[0];
            if item.hazard {
                hazards += 1;
            } else {
                collectibles += 1;
                assert_eq!(item.speed, 120.0, "collectibles never fall fast");
            }
            match item.speed {
                s if s == 360.0 => fast += 1,
                s => assert_eq!(s, 120.0),
            }
        }
        assert!(hazards > collectibles, "hazards dominate at 80% chance");
        assert!(collectibles > 0);
        assert!(fast > 0, "some hazards take the fast path");
    }

    #[test]
    fn texture_keys_track_item_kind() {
        let (mut spawner, mut env) = spawner_and_env();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            env.items.clear();
            spawner.reset();
            spawner.tick(&mut env, 1.0, &mut rng);
            let item = &env.items[0];
            if item.hazard {
                assert!(item.texture_key.ends_with("bomb.png"));
            } else {
                assert!(item.texture_key.ends_with("hextech.png"));
            }
        }
    }
}
