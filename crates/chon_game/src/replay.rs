//! Scripted input sequences for deterministic session tests: a JSON file of
//! intent frames with repeat counts, expanded into per-step `FrameIntent`s.

use crate::session::FrameIntent;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayScript {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub move_y: f32,
    #[serde(default)]
    pub pause_pressed: bool,
    #[serde(default)]
    pub restart_pressed: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayScript {
    pub fn expanded_intents(&self) -> Vec<FrameIntent> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(FrameIntent {
                    move_x: frame.move_x.clamp(-1.0, 1.0),
                    move_y: frame.move_y.clamp(-1.0, 1.0),
                    // Edge-triggered intents fire only on the first repeat.
                    pause_pressed: frame.pause_pressed && i == 0,
                    restart_pressed: frame.restart_pressed && i == 0,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayScript, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let script: ReplayScript = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&script)?;
    Ok(script)
}

fn validate_replay(script: &ReplayScript) -> Result<(), String> {
    if script.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if script.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::session::GameSession;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "chon_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "move_x": 1.0, "repeat": 3 },
                { "pause_pressed": true, "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let script = load_replay_from_path(&path).expect("replay should load");
        let expanded = script.expanded_intents();
        assert_eq!(expanded.len(), 5);
        assert!(expanded[3].pause_pressed);
        assert!(
            !expanded[4].pause_pressed,
            "repeated edge intent fires once"
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_empty_frames() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");

        let err = load_replay_from_path(&path).expect_err("empty frames should fail");
        assert!(err.contains("frames list is empty"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "move_x": 1.0, "repeat": 90 },
                { "move_x": -1.0, "move_y": -1.0, "repeat": 120 },
                { "pause_pressed": true, "repeat": 1 },
                { "move_x": 1.0, "repeat": 60 },
                { "pause_pressed": true, "repeat": 1 },
                { "move_y": 1.0, "repeat": 90 }
              ]
            }"#,
        )
        .expect("write replay file");

        let script = load_replay_from_path(&path).expect("replay should load");
        let intents = script.expanded_intents();

        let run = || {
            let mut session = GameSession::new(GameConfig::default());
            let mut rng = StdRng::seed_from_u64(2024);
            for intent in &intents {
                session.step(*intent, script.fixed_dt, &mut rng);
            }
            (
                session.env.protagonist.aabb.pos,
                session.env.protagonist.health,
                session.env.score,
                session.env.items.len(),
                session.paused,
            )
        };

        assert_eq!(run(), run());

        let _ = fs::remove_file(path);
    }
}
