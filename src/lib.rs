pub mod backend;
pub mod config;
pub mod errors;
pub mod layer;
pub mod mimetype;
pub mod player;
pub mod registry;
pub mod stream;

pub use backend::VideoBackend;
pub use config::PlayerConfig;
pub use errors::{ConfigError, MimetypeError, PlayerError, RegistryError};
pub use layer::VisibleLayer;
pub use mimetype::Mimetype;
pub use player::{PlayerBinding, VideoPlayer};
pub use registry::{
    get_instance, global, install, is_supported_type, supported_types, PlayerRegistry,
    RegistryBuilder,
};
pub use stream::{blobs, ChannelStream, InputStream, StreamWriter};
