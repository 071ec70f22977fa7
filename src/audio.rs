use crate::settings::AudioSettings;

/// Audio side of the dilation loop. The kicker calls this once per tick with the
/// current time scale; implementations glide their own playback rate toward it.
pub trait AudioRateSync {
    fn publish_time_scale(&mut self, scale: f32, dt: f32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub id: VoiceId,
    pub pitch: f32,
}

/// The set of currently playing music voices and their pitch.
#[derive(Debug, Clone)]
pub struct VoiceBank {
    voices: Vec<Voice>,
    next_id: u64,
    glide_rate: f32,
}

impl VoiceBank {
    pub fn new(settings: &AudioSettings) -> Self {
        Self {
            voices: Vec::new(),
            next_id: 1,
            glide_rate: settings.glide_rate,
        }
    }

    pub fn start_voice(&mut self) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push(Voice { id, pitch: 1.0 });
        id
    }

    pub fn stop_voice(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|v| v.id != id);
        self.voices.len() != before
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn pitch(&self, id: VoiceId) -> Option<f32> {
        self.voices.iter().find(|v| v.id == id).map(|v| v.pitch)
    }
}

impl AudioRateSync for VoiceBank {
    fn publish_time_scale(&mut self, scale: f32, dt: f32) {
        let t = (dt * self.glide_rate).clamp(0.0, 1.0);
        for v in &mut self.voices {
            v.pitch += (scale - v.pitch) * t;
        }
    }
}
