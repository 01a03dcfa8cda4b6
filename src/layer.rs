/// Rendering destination a player draws decoded frames onto.
///
/// Opaque to this crate: drawing is the concern of whatever backend is bound
/// to the layer.
pub trait VisibleLayer: Send + Sync {
    fn index(&self) -> i32;

    fn width(&self) -> u32;

    fn height(&self) -> u32;
}
