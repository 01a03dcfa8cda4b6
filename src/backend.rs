use crate::errors::PlayerError;
use crate::player::{PlayerBinding, VideoPlayer};

/// A concrete video player implementation that can be registered with a
/// [`PlayerRegistry`](crate::registry::PlayerRegistry).
pub trait VideoBackend: Send + Sync {
    /// Name used in logs and by configuration overrides.
    fn name(&self) -> &str;

    /// Mimetypes this backend can play, most preferred first. Parameters are
    /// allowed but ignored when matching.
    fn mimetypes(&self) -> Vec<String>;

    /// Builds a player bound to the given stream and layer.
    ///
    /// Must not wait for stream data: consumption starts on the backend's own
    /// schedule once the player exists.
    fn create(&self, binding: PlayerBinding) -> Result<Box<dyn VideoPlayer>, PlayerError>;
}
