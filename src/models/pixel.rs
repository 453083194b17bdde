//! Pixel selection for a camera configuration.
//!
//! The `pixel_list` key either holds the `"all"` sentinel or an explicit
//! list of pixel ids.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The sentinel value selecting every pixel of the camera.
pub const ALL_PIXELS: &str = "all";

/// Largest camera size accepted for `n_pixels`.
pub const MAX_PIXELS: u32 = 65_536;

/// Selection of camera pixels an analysis runs on.
///
/// # Example
///
/// ```
/// use digicam_config::models::PixelSelection;
///
/// let all = PixelSelection::All;
/// assert_eq!(all.resolve(4), vec![0, 1, 2, 3]);
///
/// let some = PixelSelection::List(vec![7, 12]);
/// assert_eq!(some.resolve(1296), vec![7, 12]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PixelSelection {
    /// Every pixel of the camera.
    #[default]
    All,
    /// An explicit list of pixel ids, in the order given.
    List(Vec<u32>),
}

impl PixelSelection {
    /// Returns true when the selection is the `"all"` sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, PixelSelection::All)
    }

    /// Resolves the selection into concrete pixel ids for a camera with
    /// `n_pixels` pixels.
    pub fn resolve(&self, n_pixels: u32) -> Vec<u32> {
        match self {
            PixelSelection::All => (0..n_pixels).collect(),
            PixelSelection::List(ids) => ids.clone(),
        }
    }
}

impl Serialize for PixelSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PixelSelection::All => serializer.serialize_str(ALL_PIXELS),
            PixelSelection::List(ids) => ids.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    Keyword(String),
    Ids(Vec<u32>),
}

impl<'de> Deserialize<'de> for PixelSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawSelection::deserialize(deserializer)? {
            RawSelection::Keyword(word) if word.eq_ignore_ascii_case(ALL_PIXELS) => {
                Ok(PixelSelection::All)
            }
            RawSelection::Keyword(word) => Err(D::Error::custom(format!(
                "expected \"{}\" or a list of pixel ids, found \"{}\"",
                ALL_PIXELS, word
            ))),
            RawSelection::Ids(ids) => Ok(PixelSelection::List(ids)),
        }
    }
}
