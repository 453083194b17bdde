//! Value types derived from configuration keys.
//!
//! These types give structure to the raw values of a configuration:
//! pixel selections, histogram axes, file name templates and the event
//! ranges of a parameter sweep.

mod axis;
mod pixel;
mod scan;
mod template;

pub use axis::AdcAxis;
pub use pixel::{ALL_PIXELS, MAX_PIXELS, PixelSelection};
pub use scan::{EventWindow, ScanPoint};
pub use template::{MAX_TEMPLATE_WIDTH, PathTemplate, TemplateError};
