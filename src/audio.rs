//! Sound cues
//!
//! Which event makes which sound is decided here for every target. The
//! Web Audio synthesizer itself only exists in the browser build. Procedurally
//! generated, no external files needed.

use crate::sim::{EntityKind, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Blade cut through something that isn't fruit
    Swish,
    /// Fruit sliced
    Splat,
    /// Bomb detonated
    Bomb,
}

/// Sound for a simulation event, if it has one
pub fn sound_for_event(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::Sliced {
            kind: EntityKind::Fruit,
            ..
        } => Some(SoundEffect::Splat),
        GameEvent::Sliced { .. } => Some(SoundEffect::Swish),
        GameEvent::BombHit { .. } => Some(SoundEffect::Bomb),
        _ => None,
    }
}

/// Sounds for a frame's events; one of each kind at most so a basket burst
/// doesn't stack a dozen identical voices
pub fn sounds_for_frame(events: &[GameEvent]) -> Vec<SoundEffect> {
    let mut sounds = Vec::new();
    for sound in events.iter().filter_map(sound_for_event) {
        if !sounds.contains(&sound) {
            sounds.push(sound);
        }
    }
    sounds
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use web_sys::{AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                muted: false,
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Swish => self.play_swish(ctx, vol),
                SoundEffect::Splat => self.play_splat(ctx, vol),
                SoundEffect::Bomb => self.play_bomb(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Oscillator routed through a gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Swish - band-passed white noise sweeping upward
        fn play_swish(&self, ctx: &AudioContext, vol: f32) {
            let rate = ctx.sample_rate();
            let len = (rate * 0.2) as u32;
            let Ok(buffer) = ctx.create_buffer(1, len, rate) else {
                return;
            };
            let mut samples: Vec<f32> = (0..len)
                .map(|_| (js_sys::Math::random() * 2.0 - 1.0) as f32)
                .collect();
            if buffer.copy_to_channel(&mut samples, 0).is_err() {
                return;
            }

            let (Ok(noise), Ok(filter), Ok(gain)) = (
                ctx.create_buffer_source(),
                ctx.create_biquad_filter(),
                ctx.create_gain(),
            ) else {
                return;
            };
            let t = ctx.current_time();

            noise.set_buffer(Some(&buffer));
            filter.set_type(BiquadFilterType::Bandpass);
            filter.frequency().set_value_at_time(800.0, t).ok();
            filter
                .frequency()
                .linear_ramp_to_value_at_time(3000.0, t + 0.1)
                .ok();
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();

            let wired = noise.connect_with_audio_node(&filter).is_ok()
                && filter.connect_with_audio_node(&gain).is_ok()
                && gain.connect_with_audio_node(&ctx.destination()).is_ok();
            if wired {
                noise.start().ok();
            }
        }

        /// Splat - short sawtooth drop
        fn play_splat(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(150.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Bomb - long square-wave boom
        fn play_bomb(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.8, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(10.0, t + 0.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }
    }
}
