//! Shortsmith Processing Core: the layout engine
//!
//! Turns a source clip's first frame and dimensions into a composition plan:
//! - **Geometry:** crop/resize/position math for the webcam strip, the
//!   gameplay strip, and the full-bleed zoom
//! - **Face zone:** whether a face sits inside the webcam zone
//! - **Layout:** picks one of the two composition shapes from that answer
//!
//! Apart from the optional OpenCV detector this crate is pure computation.
//! Frames come in as `image` buffers and plans go out as data.

pub mod detector;
pub mod face_zone;
pub mod geometry;
#[cfg(feature = "opencv")]
pub mod haar;
pub mod layout;

pub use detector::{default_face_detector, find_cascade};
pub use face_zone::{has_face_in_zone, FaceBox, FaceDetector, FaceZoneClassifier, ZoneVerdict};
pub use geometry::{GeometryEngine, SourceFrame};
pub use layout::{LayoutInputs, LayoutSelector};
