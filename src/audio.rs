/// Sounds the engine asks for. Mixing and playback live behind `AudioSink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Walk,
    Run,
    Thunder,
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue, looped: bool, volume: f32);
    fn stop(&mut self, cue: SoundCue);
}

/// Sink that drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue, _looped: bool, _volume: f32) {}

    fn stop(&mut self, _cue: SoundCue) {}
}
