use anyhow::Result;
use tracing::warn;

// Type alias for the default announcer type
#[cfg(not(any(test, feature = "test-mocks")))]
pub type DefaultAnnouncer = Announcer<ConsoleSpeechSender>;

#[cfg(any(test, feature = "test-mocks"))]
pub type DefaultAnnouncer = Announcer<TestSpeechSender>;

/// Trait for delivering spoken feedback - the host's speech synthesis binds
/// here; tests capture the text instead.
pub trait SpeechSender {
    fn send(&self, text: &str) -> Result<()>;
}

/// Fallback sender used when no host speech synthesis is attached: prints the
/// announcement so the CLI remains usable.
pub struct ConsoleSpeechSender;

impl SpeechSender for ConsoleSpeechSender {
    fn send(&self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }
}

/// Test sender that records every announcement instead of speaking it.
#[cfg(any(test, feature = "test-mocks"))]
pub struct TestSpeechSender {
    pub spoken: std::sync::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-mocks"))]
impl Default for TestSpeechSender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-mocks"))]
impl TestSpeechSender {
    pub fn new() -> Self {
        Self {
            spoken: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.spoken.lock().unwrap().clear();
    }
}

#[cfg(any(test, feature = "test-mocks"))]
impl SpeechSender for TestSpeechSender {
    fn send(&self, text: &str) -> Result<()> {
        tracing::debug!("Test announcement: {}", text);
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Formats and emits every user-facing announcement.
///
/// Announcements are fire-and-forget: a failing sender is logged and
/// swallowed, never propagated into gesture handling.
pub struct Announcer<T: SpeechSender = ConsoleSpeechSender> {
    sender: T,
}

impl DefaultAnnouncer {
    pub fn new() -> Self {
        #[cfg(not(any(test, feature = "test-mocks")))]
        {
            Self {
                sender: ConsoleSpeechSender,
            }
        }
        #[cfg(any(test, feature = "test-mocks"))]
        {
            Self {
                sender: TestSpeechSender::new(),
            }
        }
    }
}

impl Default for DefaultAnnouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SpeechSender> Announcer<T> {
    pub fn with_sender(sender: T) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> &T {
        &self.sender
    }

    /// Announce arbitrary text, e.g. a source or device title.
    pub fn say(&self, text: &str) {
        if let Err(e) = self.sender.send(text) {
            warn!("Announcement failed: {}", e);
        }
    }

    /// Announce a volume level as whole percentage points.
    pub fn volume(&self, level: f32) {
        self.say(&format!("Volume {}", (level * 100.0).round() as i32));
    }

    pub fn muted(&self) {
        self.say("The sound is muted");
    }

    pub fn channel(&self, number: u32) {
        self.say(&format!("Channel {}", number));
    }

    pub fn not_supported(&self) {
        self.say("Not supported");
    }

    /// The focused application has no audio session to control.
    pub fn no_sound(&self, app: &str) {
        self.say(&format!("{} is not playing any sound", app));
    }
}
