//! Footstep cadence and playback.

use bevy::prelude::*;
use rand::Rng;

use super::config::{MovementConfig, SoundConfig};

const SPRINT_STEP_INTERVAL: f32 = 0.5;
const WALK_STEP_INTERVAL: f32 = 1.;
const SPRINT_VOLUME_BOOST: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootstepKind {
    Walk,
    Sprint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootstepEvent {
    pub kind: FootstepKind,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FootstepTimer {
    elapsed: f32,
}

impl FootstepTimer {
    pub fn tick(
        &mut self,
        moving: bool,
        sprinting: bool,
        movement: &MovementConfig,
        sound: &SoundConfig,
        dt: f32,
    ) -> Option<FootstepEvent> {
        if !moving {
            return None;
        }
        self.elapsed += dt * movement.walk_speed;

        let step = if sprinting && self.elapsed > SPRINT_STEP_INTERVAL {
            FootstepEvent {
                kind: FootstepKind::Sprint,
                volume: sound.footstep_volume * SPRINT_VOLUME_BOOST,
            }
        } else if self.elapsed > WALK_STEP_INTERVAL {
            FootstepEvent {
                kind: FootstepKind::Walk,
                volume: sound.footstep_volume,
            }
        } else {
            return None;
        };
        self.elapsed = 0.;
        Some(step)
    }
}

/// Clips played for footsteps. An empty list silences that kind of step.
#[derive(Debug, Default, Resource)]
pub struct FootstepSounds {
    pub walking: Vec<Handle<AudioSource>>,
    pub sprinting: Vec<Handle<AudioSource>>,
}

impl FootstepSounds {
    pub fn new(walking: Vec<Handle<AudioSource>>, sprinting: Vec<Handle<AudioSource>>) -> Self {
        FootstepSounds { walking, sprinting }
    }

    /// A random clip of the given kind.
    pub fn pick_clip(&self, kind: FootstepKind, rng: &mut impl Rng) -> Option<Handle<AudioSource>> {
        let clips = match kind {
            FootstepKind::Walk => &self.walking,
            FootstepKind::Sprint => &self.sprinting,
        };
        if clips.is_empty() {
            return None;
        }
        Some(clips[rng.random_range(0..clips.len())].clone())
    }
}

pub fn play_footsteps(
    mut steps: EventReader<FootstepEvent>,
    sounds: Option<Res<FootstepSounds>>,
    audio: Res<Audio>,
) {
    let Some(sounds) = sounds else {
        steps.clear();
        return;
    };
    let mut rng = rand::rng();
    for step in steps.iter() {
        if let Some(clip) = sounds.pick_clip(step.kind, &mut rng) {
            audio.play_with_settings(clip, PlaybackSettings::ONCE.with_volume(step.volume));
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::asset::HandleId;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const DT: f32 = 1. / 60.;

    fn sound() -> SoundConfig {
        SoundConfig {
            enabled: true,
            footstep_volume: 0.1,
        }
    }

    #[test]
    fn standing_still_is_silent() {
        let mut timer = FootstepTimer::default();
        for _ in 0..600 {
            assert!(timer.tick(false, false, &MovementConfig::default(), &sound(), DT).is_none());
        }
    }

    #[test]
    fn walking_steps_every_interval() {
        let movement = MovementConfig::default();
        let mut timer = FootstepTimer::default();
        let steps: Vec<_> = (0..120)
            .filter_map(|_| timer.tick(true, false, &movement, &sound(), DT))
            .collect();
        // The timer gains 5 units per second and steps each time it passes 1.
        assert!(steps.len() >= 9 && steps.len() <= 10, "{} steps", steps.len());
        assert!(steps.iter().all(|s| s.kind == FootstepKind::Walk && s.volume == 0.1));
    }

    #[test]
    fn sprinting_steps_faster_and_louder() {
        let movement = MovementConfig::default();
        let mut timer = FootstepTimer::default();
        let steps: Vec<_> = (0..120)
            .filter_map(|_| timer.tick(true, true, &movement, &sound(), DT))
            .collect();
        assert!(steps.len() >= 17, "{} steps", steps.len());
        assert!(steps
            .iter()
            .all(|s| s.kind == FootstepKind::Sprint && (s.volume - 0.15).abs() < 1e-6));
    }

    #[test]
    fn clips_come_from_the_matching_list() {
        let clips = |count: usize| -> Vec<Handle<AudioSource>> {
            (0..count)
                .map(|_| Handle::weak(HandleId::random::<AudioSource>()))
                .collect()
        };
        let sounds = FootstepSounds::new(clips(4), clips(3));
        let mut rng = StdRng::seed_from_u64(7);

        let mut walked = Vec::new();
        for _ in 0..200 {
            let walk = sounds.pick_clip(FootstepKind::Walk, &mut rng).unwrap();
            assert!(sounds.walking.contains(&walk));
            let sprint = sounds.pick_clip(FootstepKind::Sprint, &mut rng).unwrap();
            assert!(sounds.sprinting.contains(&sprint));
            if !walked.contains(&walk) {
                walked.push(walk);
            }
        }
        assert_eq!(walked.len(), sounds.walking.len());
    }

    #[test]
    fn empty_list_is_silent() {
        let sounds = FootstepSounds::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sounds.pick_clip(FootstepKind::Sprint, &mut rng).is_none());
    }
}
