/// Fly-to animation of the rotation.
pub mod animation;
/// Country features and their names.
pub mod features;
/// Click and drag detection.
pub mod gesture;
/// The globe widget.
pub mod globe_egui;
/// Orthographic projection and rotation.
pub mod projection;
pub mod spherical;
/// World boundary decoding.
pub mod topojson;
