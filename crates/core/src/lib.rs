//! Eye geometry estimation and colored-lens compositing.
//!
//! Eyes are located from face-mesh landmarks (or placed by hand), a lens
//! image is prepared into an RGBA texture with a measured intrinsic radius,
//! and each iris is either overlaid with the warped texture or recolored
//! toward the lens color. An optional refinement pass smooths the seam.

pub mod compositing;
pub mod detection;
pub mod imaging;
pub mod lens;
pub mod pipeline;
pub mod refinement;
pub mod shared;
