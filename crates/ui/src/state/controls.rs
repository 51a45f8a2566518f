/// Enabled/visible flags of the composer controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub mic_enabled: bool,
    /// Hidden when no speech capability exists
    pub mic_visible: bool,
    pub listening: bool,
}

impl Controls {
    pub fn new(mic_visible: bool) -> Self {
        Self { input_enabled: true, send_enabled: true, mic_enabled: mic_visible, mic_visible, listening: false }
    }

    /// Lock input, send and mic while a reply is in flight
    pub fn lock(&mut self) {
        self.input_enabled = false;
        self.send_enabled = false;
        self.mic_enabled = false;
    }

    pub fn unlock(&mut self) {
        self.input_enabled = true;
        self.send_enabled = true;
        self.mic_enabled = self.mic_visible;
    }

    pub fn is_locked(&self) -> bool {
        !self.send_enabled
    }

    /// The mic control can be toggled
    pub fn mic_usable(&self) -> bool {
        self.mic_visible && self.mic_enabled
    }
}
