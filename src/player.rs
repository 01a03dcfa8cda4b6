use std::fmt;
use std::sync::Arc;

use crate::errors::PlayerError;
use crate::layer::VisibleLayer;
use crate::mimetype::Mimetype;
use crate::stream::InputStream;

/// The stream, layer and mimetype a player was created for.
///
/// There are no setters: a player stays bound to the same stream and layer
/// for as long as it lives. The handles are shared, so the caller keeps
/// ownership of both and remains responsible for closing the stream and
/// disposing of the layer.
#[derive(Clone)]
pub struct PlayerBinding {
    stream: Arc<dyn InputStream>,
    layer: Arc<dyn VisibleLayer>,
    mimetype: Mimetype,
}

impl PlayerBinding {
    pub fn new(
        stream: Arc<dyn InputStream>,
        layer: Arc<dyn VisibleLayer>,
        mimetype: Mimetype,
    ) -> Self {
        Self {
            stream,
            layer,
            mimetype,
        }
    }

    pub fn stream(&self) -> &Arc<dyn InputStream> {
        &self.stream
    }

    pub fn layer(&self) -> &Arc<dyn VisibleLayer> {
        &self.layer
    }

    pub fn mimetype(&self) -> &Mimetype {
        &self.mimetype
    }
}

impl fmt::Debug for PlayerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerBinding")
            .field("stream", &self.stream.index())
            .field("layer", &self.layer.index())
            .field("mimetype", &self.mimetype.to_string())
            .finish()
    }
}

/// A video playback session reading from one stream and drawing to one layer.
pub trait VideoPlayer: Send {
    fn binding(&self) -> &PlayerBinding;

    /// Notifies the player that all video up to the current point in time
    /// has been given via its stream. Any difference between queued video
    /// and the current time is latency to catch up on, not backlog to play
    /// at normal speed.
    ///
    /// Does nothing unless the backend overrides it.
    fn sync(&mut self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn stream(&self) -> &Arc<dyn InputStream> {
        self.binding().stream()
    }

    fn layer(&self) -> &Arc<dyn VisibleLayer> {
        self.binding().layer()
    }

    fn mimetype(&self) -> &Mimetype {
        self.binding().mimetype()
    }
}

impl VideoPlayer for PlayerBinding {
    fn binding(&self) -> &PlayerBinding {
        self
    }
}
