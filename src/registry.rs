//! Capability queries over the registered video backends.
//!
//! A [`PlayerRegistry`] is built once, typically at startup, and then only
//! read. Lookups compare only the `type/subtype` essence of the requested
//! mimetype, so case and parameters never affect whether a type is
//! supported, even when the parameters themselves are malformed. Among matching
//! backends the one with the highest priority wins; ties go to whichever was
//! registered first.
//!
//! The process-wide registry is empty until [`install`] is called, in which
//! case nothing is supported and [`get_instance`] always returns `None`.
//! The first query through [`global`] or the free functions fixes the
//! process-wide registry for good, so [`install`] has to run before any of
//! them.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::backend::VideoBackend;
use crate::config::PlayerConfig;
use crate::errors::RegistryError;
use crate::layer::VisibleLayer;
use crate::mimetype::Mimetype;
use crate::player::{PlayerBinding, VideoPlayer};
use crate::stream::InputStream;

struct Registration {
    backend: Arc<dyn VideoBackend>,
    priority: i32,
    // essences only, in the backend's order of preference
    mimetypes: Vec<Mimetype>,
}

impl Registration {
    fn supports(&self, mimetype: &Mimetype) -> bool {
        self.mimetypes.iter().any(|m| m.matches(mimetype))
    }
}

pub struct RegistryBuilder {
    config: PlayerConfig,
    pending: Vec<(Arc<dyn VideoBackend>, i32)>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            config: PlayerConfig::default(),
            pending: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register<B: VideoBackend + 'static>(self, backend: B) -> Self {
        self.register_with_priority(backend, 0)
    }

    pub fn register_with_priority<B: VideoBackend + 'static>(
        mut self,
        backend: B,
        priority: i32,
    ) -> Self {
        self.pending.push((Arc::new(backend), priority));
        self
    }

    pub fn build(self) -> PlayerRegistry {
        let config = self.config;

        let mut entries: Vec<Registration> = self
            .pending
            .into_iter()
            .filter(|(backend, _)| {
                let disabled = config.is_disabled(backend.name());
                if disabled {
                    debug!(backend = backend.name(), "Skipping disabled video backend");
                }
                !disabled
            })
            .map(|(backend, priority)| {
                let priority = config
                    .priorities
                    .get(backend.name())
                    .copied()
                    .unwrap_or(priority);
                let mimetypes = declared_mimetypes(backend.as_ref());

                Registration {
                    backend,
                    priority,
                    mimetypes,
                }
            })
            .collect();

        // stable, so equal priorities keep registration order
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));

        PlayerRegistry {
            entries,
            forward_parameters: config.forward_parameters,
        }
    }
}

fn declared_mimetypes(backend: &dyn VideoBackend) -> Vec<Mimetype> {
    let mut mimetypes: Vec<Mimetype> = Vec::new();

    for declared in backend.mimetypes() {
        match Mimetype::parse(&declared) {
            Ok(mimetype) => {
                let essence = mimetype.without_parameters();
                if !mimetypes.contains(&essence) {
                    mimetypes.push(essence);
                }
            }
            Err(err) => {
                warn!(
                    backend = backend.name(),
                    mimetype = declared.as_str(),
                    "Ignoring invalid mimetype declared by video backend: {err}"
                );
            }
        }
    }

    mimetypes
}

pub struct PlayerRegistry {
    entries: Vec<Registration>,
    forward_parameters: bool,
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        RegistryBuilder::new().build()
    }
}

impl PlayerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backend names, highest priority first.
    pub fn backends(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.backend.name()).collect()
    }

    /// Whether any registered backend can play the given mimetype.
    pub fn is_supported_type(&self, mimetype: &str) -> bool {
        match Mimetype::parse_essence(mimetype) {
            Ok(mimetype) => self.entries.iter().any(|e| e.supports(&mimetype)),
            Err(err) => {
                debug!(mimetype, "Unsupported malformed mimetype: {err}");
                false
            }
        }
    }

    /// Every supported mimetype essence, in rough order of priority. Never
    /// includes parameters.
    pub fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();

        for mimetype in self.entries.iter().flat_map(|e| e.mimetypes.iter()) {
            if !types.iter().any(|t| t == mimetype.essence()) {
                types.push(mimetype.essence().to_string());
            }
        }

        types
    }

    /// Creates a player for the given mimetype bound to `stream` and `layer`,
    /// or returns `None` if no backend supports it.
    ///
    /// A backend that fails to construct is logged and skipped in favour of
    /// the next matching one. The handles are only cloned once a matching
    /// backend is found.
    pub fn get_instance(
        &self,
        stream: &Arc<dyn InputStream>,
        layer: &Arc<dyn VisibleLayer>,
        mimetype: &str,
    ) -> Option<Box<dyn VideoPlayer>> {
        let requested = match Mimetype::parse_essence(mimetype) {
            Ok(mimetype) => mimetype,
            Err(err) => {
                debug!(mimetype, "No video player for malformed mimetype: {err}");
                return None;
            }
        };

        if !self.entries.iter().any(|e| e.supports(&requested)) {
            debug!(mimetype = %requested, "No video player available");
            return None;
        }

        let forwarded = if self.forward_parameters {
            Mimetype::parse(mimetype).unwrap_or_else(|err| {
                debug!(mimetype, "Forwarding essence only, parameters are malformed: {err}");
                requested.clone()
            })
        } else {
            requested.clone()
        };

        for entry in self.entries.iter().filter(|e| e.supports(&requested)) {
            let binding = PlayerBinding::new(stream.clone(), layer.clone(), forwarded.clone());

            match entry.backend.create(binding) {
                Ok(player) => {
                    debug!(
                        backend = entry.backend.name(),
                        mimetype = %requested,
                        "Created video player"
                    );
                    return Some(player);
                }
                Err(err) => {
                    warn!(
                        backend = entry.backend.name(),
                        mimetype = %requested,
                        "Video backend failed to create player: {err}"
                    );
                }
            }
        }

        debug!(mimetype = %requested, "No video player available");
        None
    }
}

static GLOBAL: OnceCell<PlayerRegistry> = OnceCell::new();

/// Installs the process-wide registry. Only the first call succeeds, and it
/// must happen before anything queries [`global`].
pub fn install(registry: PlayerRegistry) -> Result<(), RegistryError> {
    let backends = registry.len();

    GLOBAL.set(registry).map_err(|_| {
        warn!(
            "Video player registry already initialized; \
             install must run before the first registry query"
        );
        RegistryError::AlreadyInstalled
    })?;

    info!(backends, "Installed video player registry");
    Ok(())
}

/// The process-wide registry.
///
/// Calling this (or any of the free query functions) before [`install`]
/// locks in an empty registry for the rest of the process, and every later
/// [`install`] fails with [`RegistryError::AlreadyInstalled`].
pub fn global() -> &'static PlayerRegistry {
    GLOBAL.get_or_init(PlayerRegistry::default)
}

/// Queries [`global`]; see there for the ordering requirement on [`install`].
pub fn is_supported_type(mimetype: &str) -> bool {
    global().is_supported_type(mimetype)
}

pub fn supported_types() -> Vec<String> {
    global().supported_types()
}

pub fn get_instance(
    stream: &Arc<dyn InputStream>,
    layer: &Arc<dyn VisibleLayer>,
    mimetype: &str,
) -> Option<Box<dyn VideoPlayer>> {
    global().get_instance(stream, layer, mimetype)
}
