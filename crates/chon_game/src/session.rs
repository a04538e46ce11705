//! The headless fixed-step game core. The windowed engine maps raw input to a
//! `FrameIntent` and calls `step` once per fixed dt slice; everything the game
//! does to its world happens here, so the whole loop is testable without a
//! window or a GPU.

use crate::config::GameConfig;
use crate::environment::Environment;
use crate::spawner::ItemSpawner;
use glam::Vec2;
use rand::Rng;

/// Player input condensed for one simulation step.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameIntent {
    /// Horizontal movement in [-1, 1].
    pub move_x: f32,
    /// Vertical movement in [-1, 1]; positive is down.
    pub move_y: f32,
    pub pause_pressed: bool,
    pub restart_pressed: bool,
}

impl FrameIntent {
    /// The same intent with the edge-triggered presses cleared. A slow frame
    /// runs several fixed steps from one input sample; presses apply to the
    /// first step only, or a pause toggle would cancel itself.
    pub fn held_only(self) -> Self {
        Self {
            pause_pressed: false,
            restart_pressed: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    GameOver,
}

pub struct GameSession {
    pub env: Environment,
    spawner: ItemSpawner,
    pub paused: bool,
    pub phase: Phase,
    config: GameConfig,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let env = Environment::from_config(&config);
        let spawner = ItemSpawner::new(config.spawner.clone(), &config.textures);
        Self {
            env,
            spawner,
            paused: false,
            phase: Phase::Running,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Advances the simulation by one fixed step. Order follows the original
    /// game loop: movement, borders, spawn, fall, item collision, prune,
    /// patrol, agent collision.
    pub fn step<R: Rng>(&mut self, intent: FrameIntent, dt: f32, rng: &mut R) {
        // Restart applies in every phase, same as the HUD button.
        if intent.restart_pressed {
            self.restart();
            return;
        }
        if intent.pause_pressed && self.phase == Phase::Running {
            self.toggle_pause();
        }
        if self.paused || self.phase == Phase::GameOver {
            return;
        }

        let movement = Vec2::new(intent.move_x, intent.move_y);
        if movement != Vec2::ZERO {
            self.env.protagonist.move_by(movement, dt);
            self.env.check_borders();
        }

        self.spawner.tick(&mut self.env, dt, rng);

        for item in &mut self.env.items {
            item.fall(dt);
        }
        self.env.detect_item_collisions(self.config.damage.hazard);
        self.env.cleanup_items();

        let enemy = &self.config.enemy;
        for agent in &mut self.env.agents {
            agent.patrol(enemy.patrol_min_x, enemy.patrol_max_x, dt);
        }
        self.env
            .detect_agent_collisions(self.config.damage.agent_contact);

        if self.env.protagonist.is_dead() {
            log::info!("Protagonist defeated with score {}", self.env.score);
            self.phase = Phase::GameOver;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("Game {}", if self.paused { "PAUSED" } else { "RESUMED" });
    }

    /// Resets the world to its configured starting state: fresh environment,
    /// zero score, cold spawner.
    pub fn restart(&mut self) {
        self.env = Environment::from_config(&self.config);
        self.spawner.reset();
        self.paused = false;
        self.phase = Phase::Running;
        log::info!("Game restarted");
    }

    /// Applies a hot-reloaded config: tuning values change in place, but the
    /// running world (positions, items, score) is preserved.
    pub fn apply_config(&mut self, config: GameConfig) {
        self.env.width = config.world.width;
        self.env.height = config.world.height;
        self.env.ground_offset = config.world.ground_offset;
        self.env.protagonist.speed = config.protagonist.speed;
        self.env.protagonist.max_health = config.protagonist.max_health;
        self.env.protagonist.health = self
            .env
            .protagonist
            .health
            .min(config.protagonist.max_health);
        for agent in &mut self.env.agents {
            agent.speed = config.enemy.speed;
        }
        self.spawner = ItemSpawner::new(config.spawner.clone(), &config.textures);
        self.env.check_borders();
        self.config = config;
    }
}
