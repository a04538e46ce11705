//! Game configuration loaded from JSON, with strict validation and hard
//! defaults so the game runs with no config file at all. The file is watched
//! by mtime polling and re-applied at frame boundaries.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub protagonist: ProtagonistConfig,
    pub enemy: EnemyConfig,
    pub spawner: SpawnerConfig,
    pub damage: DamageConfig,
    pub textures: TextureConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Items whose box reaches `height - ground_offset` are pruned.
    pub ground_offset: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 780.0,
            ground_offset: 50.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProtagonistConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub max_health: i32,
}

impl Default for ProtagonistConfig {
    fn default() -> Self {
        Self {
            start_x: 400.0,
            start_y: 580.0,
            width: 160.0,
            height: 150.0,
            speed: 180.0,
            max_health: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnemyConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub max_health: i32,
    pub patrol_min_x: f32,
    pub patrol_max_x: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            start_x: 920.0,
            start_y: 20.0,
            width: 160.0,
            height: 150.0,
            speed: 120.0,
            max_health: 3,
            patrol_min_x: 50.0,
            patrol_max_x: 1070.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Simulated seconds between spawns.
    pub spawn_delay: f32,
    pub max_items: usize,
    pub item_size: f32,
    /// Probability a spawned item is a hazard.
    pub hazard_chance: f64,
    /// Probability a hazard falls at `fall_speed_fast`.
    pub fast_chance: f64,
    pub fall_speed: f32,
    pub fall_speed_fast: f32,
    /// Right-side margin kept clear so items never spawn clipped off-screen.
    pub spawn_margin: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_delay: 0.35,
            max_items: 50,
            item_size: 60.0,
            hazard_chance: 0.8,
            fast_chance: 0.4,
            fall_speed: 120.0,
            fall_speed_fast: 360.0,
            spawn_margin: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DamageConfig {
    /// Damage per overlapping enemy per step.
    pub agent_contact: i32,
    /// Damage from catching a hazard item.
    pub hazard: i32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            agent_contact: 10,
            hazard: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TextureConfig {
    pub background: String,
    pub pause: String,
    pub protagonist: String,
    pub enemy: String,
    pub hazard: String,
    pub collectible: String,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            background: "assets/textures/castle.png".to_string(),
            pause: "assets/textures/pause.png".to_string(),
            protagonist: "assets/textures/vi.png".to_string(),
            enemy: "assets/textures/jinx.png".to_string(),
            hazard: "assets/textures/bomb.png".to_string(),
            collectible: "assets/textures/hextech.png".to_string(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.world.width <= 0.0 || config.world.height <= 0.0 {
        return Err("Config validation failed: world dimensions must be > 0".to_string());
    }
    if config.world.ground_offset < 0.0 {
        return Err("Config validation failed: ground_offset must be >= 0".to_string());
    }
    if config.protagonist.max_health <= 0 {
        return Err("Config validation failed: protagonist max_health must be > 0".to_string());
    }
    if config.enemy.patrol_min_x >= config.enemy.patrol_max_x {
        return Err(
            "Config validation failed: patrol_min_x must be less than patrol_max_x".to_string(),
        );
    }
    let spawner = &config.spawner;
    if spawner.spawn_delay <= 0.0 {
        return Err("Config validation failed: spawn_delay must be > 0".to_string());
    }
    if spawner.max_items == 0 {
        return Err("Config validation failed: max_items must be > 0".to_string());
    }
    if spawner.item_size <= 0.0 || spawner.item_size + spawner.spawn_margin >= config.world.width {
        return Err("Config validation failed: item_size/spawn_margin leave no spawn room"
            .to_string());
    }
    for (name, chance) in [
        ("hazard_chance", spawner.hazard_chance),
        ("fast_chance", spawner.fast_chance),
    ] {
        if !(0.0..=1.0).contains(&chance) {
            return Err(format!(
                "Config validation failed: {name} must be within [0, 1]"
            ));
        }
    }
    if spawner.fall_speed <= 0.0 || spawner.fall_speed_fast <= 0.0 {
        return Err("Config validation failed: fall speeds must be > 0".to_string());
    }
    Ok(())
}

/// Polls a file's mtime; `should_reload` reports true once per observed change.
pub struct FileWatcher {
    path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl FileWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&path);
        Self {
            path,
            last_seen_modified,
        }
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}
