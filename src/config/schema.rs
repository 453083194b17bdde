//! Configuration schema: required keys per theme and type coercion.
//!
//! The schema runs on the raw YAML mapping before typed deserialization so
//! that every failure can name the offending key.

use serde_yaml::{Mapping, Number, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::models::{ALL_PIXELS, MAX_PIXELS};

use super::types::{ConfigTheme, HISTO_FILENAME_SUFFIX};

/// The type a configuration key must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A boolean toggle.
    Bool,
    /// A string (identifier, path or filename).
    Text,
    /// A signed integer.
    Int,
    /// A non-negative integer.
    UInt,
    /// A camera pixel count, at most [`MAX_PIXELS`].
    PixelCount,
    /// A sequence of signed integers.
    IntSeq,
    /// A sequence of numbers.
    NumSeq,
    /// The `"all"` sentinel or a sequence of non-negative integers.
    Pixels,
}

impl FieldKind {
    /// Human-readable name of the expected type.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::Text => "string",
            FieldKind::Int => "integer",
            FieldKind::UInt => "non-negative integer",
            FieldKind::PixelCount => "pixel count between 0 and 65536",
            FieldKind::IntSeq => "sequence of integers",
            FieldKind::NumSeq => "sequence of numbers",
            FieldKind::Pixels => "\"all\" or sequence of pixel ids",
        }
    }
}

/// When a key must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Required for every theme.
    Always,
    /// Required for the listed themes, optional otherwise.
    Themes(&'static [ConfigTheme]),
    /// Never required.
    Optional,
}

/// Declaration of one configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The key name.
    pub key: &'static str,
    /// The type the value must hold.
    pub kind: FieldKind,
    /// When the key must be present.
    pub requirement: Requirement,
}

impl FieldSpec {
    const fn new(key: &'static str, kind: FieldKind, requirement: Requirement) -> Self {
        Self {
            key,
            kind,
            requirement,
        }
    }

    /// Returns true when the key must be present for `theme`.
    pub fn is_required(&self, theme: ConfigTheme) -> bool {
        match self.requirement {
            Requirement::Always => true,
            Requirement::Themes(themes) => themes.contains(&theme),
            Requirement::Optional => false,
        }
    }
}

const MPE: &[ConfigTheme] = &[ConfigTheme::Mpe];
const TRIGGER: &[ConfigTheme] = &[ConfigTheme::Trigger];
const MPE_AND_TRIGGER: &[ConfigTheme] = &[ConfigTheme::Mpe, ConfigTheme::Trigger];

/// Every key known to the schema.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("analysis_module", FieldKind::Text, Requirement::Always),
    FieldSpec::new("verbose", FieldKind::Bool, Requirement::Optional),
    FieldSpec::new("mc", FieldKind::Bool, Requirement::Optional),
    FieldSpec::new("create_histo", FieldKind::Bool, Requirement::Optional),
    FieldSpec::new("perform_analysis", FieldKind::Bool, Requirement::Optional),
    FieldSpec::new("display_results", FieldKind::Bool, Requirement::Optional),
    FieldSpec::new("blinding", FieldKind::Bool, Requirement::Optional),
    FieldSpec::new("log_file_basename", FieldKind::Text, Requirement::Optional),
    FieldSpec::new("file_basename", FieldKind::Text, Requirement::Always),
    FieldSpec::new("directory", FieldKind::Text, Requirement::Always),
    FieldSpec::new("cts_directory", FieldKind::Text, Requirement::Optional),
    FieldSpec::new("output_directory", FieldKind::Text, Requirement::Always),
    FieldSpec::new("file_list", FieldKind::IntSeq, Requirement::Always),
    FieldSpec::new("scan_level", FieldKind::IntSeq, Requirement::Always),
    FieldSpec::new("nsb_rate", FieldKind::NumSeq, Requirement::Themes(TRIGGER)),
    FieldSpec::new("threshold", FieldKind::NumSeq, Requirement::Themes(TRIGGER)),
    FieldSpec::new("events_per_level", FieldKind::UInt, Requirement::Themes(MPE)),
    FieldSpec::new("n_evt_per_batch", FieldKind::UInt, Requirement::Optional),
    FieldSpec::new("evt_max", FieldKind::UInt, Requirement::Themes(MPE_AND_TRIGGER)),
    FieldSpec::new("evt_min", FieldKind::UInt, Requirement::Optional),
    FieldSpec::new("window_width", FieldKind::UInt, Requirement::Themes(TRIGGER)),
    FieldSpec::new(
        "baseline_window_width",
        FieldKind::UInt,
        Requirement::Themes(TRIGGER),
    ),
    FieldSpec::new("cluster_size", FieldKind::UInt, Requirement::Themes(TRIGGER)),
    FieldSpec::new(
        "compression_factor",
        FieldKind::UInt,
        Requirement::Themes(TRIGGER),
    ),
    FieldSpec::new("clipping_patch", FieldKind::UInt, Requirement::Themes(TRIGGER)),
    FieldSpec::new(
        "n_pixels",
        FieldKind::PixelCount,
        Requirement::Themes(MPE_AND_TRIGGER),
    ),
    FieldSpec::new("histo_filename", FieldKind::Text, Requirement::Always),
    FieldSpec::new("adcs_min", FieldKind::Int, Requirement::Themes(MPE)),
    FieldSpec::new("adcs_max", FieldKind::Int, Requirement::Themes(MPE)),
    FieldSpec::new("adcs_binwidth", FieldKind::UInt, Requirement::Themes(MPE)),
    FieldSpec::new("pixel_list", FieldKind::Pixels, Requirement::Optional),
];

/// Looks up the declaration of a key.
pub fn field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Keys that must be present for `theme`, in schema order.
pub fn required_keys(theme: ConfigTheme) -> impl Iterator<Item = &'static str> {
    FIELDS
        .iter()
        .filter(move |f| f.is_required(theme))
        .map(|f| f.key)
}

/// Describes the YAML type of a value for error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Converts a parsed document into its root mapping.
///
/// Fails with [`ConfigError::Parse`] when the root is not a mapping or a
/// key is not a string.
pub fn into_mapping(path: &str, document: Value) -> ConfigResult<Mapping> {
    let mapping = match document {
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ConfigError::Parse {
                path: path.to_string(),
                message: format!("document root must be a mapping, found {}", describe(&other)),
            });
        }
    };

    if let Some((key, _)) = mapping.iter().find(|(key, _)| !key.is_string()) {
        return Err(ConfigError::Parse {
            path: path.to_string(),
            message: format!("mapping keys must be strings, found {}", describe(key)),
        });
    }

    Ok(mapping)
}

/// Reads the `analysis_module` key, which selects the theme.
pub fn analysis_module<'a>(path: &str, mapping: &'a Mapping) -> ConfigResult<&'a str> {
    match mapping.get("analysis_module") {
        None | Some(Value::Null) => Err(ConfigError::MissingKey {
            path: path.to_string(),
            key: "analysis_module".to_string(),
        }),
        Some(Value::String(name)) => Ok(name),
        Some(other) => Err(ConfigError::TypeMismatch {
            path: path.to_string(),
            key: "analysis_module".to_string(),
            expected: FieldKind::Text.expected().to_string(),
            found: describe(other).to_string(),
        }),
    }
}

/// Checks presence and type of every key for `theme`, applying coercions.
///
/// Null values on optional keys are dropped so that defaults apply. Keys
/// unknown to the schema are kept untouched, except that any
/// `*_histo_filename` key must hold a string.
pub fn check_document(path: &str, mut mapping: Mapping, theme: ConfigTheme) -> ConfigResult<Mapping> {
    for spec in FIELDS {
        let value = match mapping.get(spec.key) {
            Some(value) if !value.is_null() => value,
            _ => {
                mapping.remove(spec.key);
                if spec.is_required(theme) {
                    return Err(ConfigError::MissingKey {
                        path: path.to_string(),
                        key: spec.key.to_string(),
                    });
                }
                continue;
            }
        };

        let coerced = coerce(spec.kind, value).map_err(|found| ConfigError::TypeMismatch {
            path: path.to_string(),
            key: spec.key.to_string(),
            expected: spec.kind.expected().to_string(),
            found,
        })?;
        if &coerced != value {
            debug!(path = %path, key = spec.key, "Coerced configuration value");
        }
        mapping.insert(Value::String(spec.key.to_string()), coerced);
    }

    for (key, value) in mapping.iter() {
        let Some(key) = key.as_str() else { continue };
        if key.ends_with(HISTO_FILENAME_SUFFIX) && !value.is_string() {
            return Err(ConfigError::TypeMismatch {
                path: path.to_string(),
                key: key.to_string(),
                expected: FieldKind::Text.expected().to_string(),
                found: describe(value).to_string(),
            });
        }
    }

    Ok(mapping)
}

/// Coerces a value to `kind`, or returns a description of what was found.
pub fn coerce(kind: FieldKind, value: &Value) -> Result<Value, String> {
    match kind {
        FieldKind::Bool => coerce_bool(value).map(Value::Bool),
        FieldKind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(describe(other).to_string()),
        },
        FieldKind::Int => coerce_int(value).map(|i| Value::Number(Number::from(i))),
        FieldKind::UInt => coerce_uint(value).map(|u| Value::Number(Number::from(u))),
        FieldKind::PixelCount => match coerce_uint(value)? {
            n if n <= u64::from(MAX_PIXELS) => Ok(Value::Number(Number::from(n))),
            n => Err(format!("integer {} above {}", n, MAX_PIXELS)),
        },
        FieldKind::IntSeq => coerce_seq(value, |v| {
            coerce_int(v).map(|i| Value::Number(Number::from(i)))
        }),
        FieldKind::NumSeq => coerce_seq(value, |v| match v {
            Value::Number(_) => Ok(v.clone()),
            other => Err(describe(other).to_string()),
        }),
        FieldKind::Pixels => match value {
            Value::String(word) if word.eq_ignore_ascii_case(ALL_PIXELS) => {
                Ok(Value::String(ALL_PIXELS.to_string()))
            }
            Value::String(word) => Err(format!("string \"{}\"", word)),
            Value::Sequence(_) => coerce_seq(value, |v| {
                let id = coerce_uint(v)?;
                u32::try_from(id)
                    .map(|id| Value::Number(Number::from(id)))
                    .map_err(|_| format!("integer {} out of range", id))
            }),
            other => Err(describe(other).to_string()),
        },
    }
}

fn coerce_bool(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(word) => match word.to_ascii_lowercase().as_str() {
            "yes" | "on" | "true" => Ok(true),
            "no" | "off" | "false" => Ok(false),
            _ => Err(format!("string \"{}\"", word)),
        },
        other => Err(describe(other).to_string()),
    }
}

fn coerce_int(value: &Value) -> Result<i64, String> {
    let Value::Number(number) = value else {
        return Err(describe(value).to_string());
    };
    if let Some(i) = number.as_i64() {
        return Ok(i);
    }
    if number.is_f64() {
        let f = number.as_f64().unwrap_or(f64::NAN);
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            return Ok(f as i64);
        }
        return Err(format!("float {}", f));
    }
    Err(format!("integer {} out of range", number))
}

fn coerce_uint(value: &Value) -> Result<u64, String> {
    if let Value::Number(number) = value {
        if let Some(u) = number.as_u64() {
            return Ok(u);
        }
    }
    let i = coerce_int(value)?;
    u64::try_from(i).map_err(|_| format!("negative integer {}", i))
}

fn coerce_seq<F>(value: &Value, mut element: F) -> Result<Value, String>
where
    F: FnMut(&Value) -> Result<Value, String>,
{
    let Value::Sequence(items) = value else {
        return Err(describe(value).to_string());
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            element(item).map_err(|found| format!("sequence with {} at index {}", found, index))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> Value {
        serde_yaml::from_str(source).unwrap()
    }

    fn mapping(source: &str) -> Mapping {
        into_mapping("test.yaml", yaml(source)).unwrap()
    }

    const GENERIC: &str = r#"
analysis_module: analyse_synchro
file_basename: 'run_%d.fits.fz'
directory: '/data/'
output_directory: '/data/out/'
file_list: [1, 2]
scan_level: [0, 1]
histo_filename: 'peaks.npz'
"#;

    #[test]
    fn test_required_keys_per_theme() {
        let generic: Vec<_> = required_keys(ConfigTheme::Generic).collect();
        assert_eq!(
            generic,
            vec![
                "analysis_module",
                "file_basename",
                "directory",
                "output_directory",
                "file_list",
                "scan_level",
                "histo_filename"
            ]
        );

        let mpe: Vec<_> = required_keys(ConfigTheme::Mpe).collect();
        assert!(mpe.contains(&"events_per_level"));
        assert!(mpe.contains(&"adcs_binwidth"));
        assert!(!mpe.contains(&"nsb_rate"));

        let trigger: Vec<_> = required_keys(ConfigTheme::Trigger).collect();
        assert!(trigger.contains(&"nsb_rate"));
        assert!(trigger.contains(&"clipping_patch"));
        assert!(!trigger.contains(&"events_per_level"));
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(field("scan_level").unwrap().kind, FieldKind::IntSeq);
        assert!(field("unknown_key").is_none());
    }

    #[test]
    fn test_generic_document_passes() {
        assert!(check_document("test.yaml", mapping(GENERIC), ConfigTheme::Generic).is_ok());
    }

    #[test]
    fn test_missing_required_key_names_key() {
        let result = check_document("test.yaml", mapping(GENERIC), ConfigTheme::Mpe);
        match result {
            Err(ConfigError::MissingKey { path, key }) => {
                assert_eq!(path, "test.yaml");
                assert_eq!(key, "events_per_level");
            }
            other => panic!("Expected MissingKey error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_required_key_is_missing() {
        let source = GENERIC.replace("histo_filename: 'peaks.npz'", "histo_filename: ~");
        let result = check_document("test.yaml", mapping(&source), ConfigTheme::Generic);
        assert!(matches!(
            result,
            Err(ConfigError::MissingKey { ref key, .. }) if key == "histo_filename"
        ));
    }

    #[test]
    fn test_null_optional_key_is_dropped() {
        let source = format!("{}mc: null\n", GENERIC);
        let checked = check_document("test.yaml", mapping(&source), ConfigTheme::Generic).unwrap();
        assert!(checked.get("mc").is_none());
    }

    #[test]
    fn test_scan_level_with_string_is_type_mismatch() {
        let source = GENERIC.replace("scan_level: [0, 1]", "scan_level: [0, one]");
        match check_document("test.yaml", mapping(&source), ConfigTheme::Generic) {
            Err(ConfigError::TypeMismatch {
                key,
                expected,
                found,
                ..
            }) => {
                assert_eq!(key, "scan_level");
                assert_eq!(expected, "sequence of integers");
                assert_eq!(found, "sequence with string at index 1");
            }
            other => panic!("Expected TypeMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_level_scalar_is_type_mismatch() {
        let source = GENERIC.replace("scan_level: [0, 1]", "scan_level: 21");
        let result = check_document("test.yaml", mapping(&source), ConfigTheme::Generic);
        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch { ref found, .. }) if found == "integer"
        ));
    }

    #[test]
    fn test_yaml_1_1_booleans_are_coerced() {
        assert_eq!(coerce(FieldKind::Bool, &yaml("'yes'")), Ok(Value::Bool(true)));
        assert_eq!(coerce(FieldKind::Bool, &yaml("'Off'")), Ok(Value::Bool(false)));
        assert!(coerce(FieldKind::Bool, &yaml("'maybe'")).is_err());
        assert!(coerce(FieldKind::Bool, &yaml("1")).is_err());
    }

    #[test]
    fn test_integral_float_is_coerced_to_integer() {
        assert_eq!(
            coerce(FieldKind::UInt, &yaml("2.1e5")),
            Ok(Value::Number(Number::from(210_000u64)))
        );
        assert_eq!(
            coerce(FieldKind::Int, &yaml("-3.0")),
            Ok(Value::Number(Number::from(-3i64)))
        );
        assert_eq!(coerce(FieldKind::Int, &yaml("2.5")), Err("float 2.5".to_string()));
    }

    #[test]
    fn test_negative_value_for_unsigned_key() {
        assert_eq!(
            coerce(FieldKind::UInt, &yaml("-1")),
            Err("negative integer -1".to_string())
        );
    }

    #[test]
    fn test_number_sequence_accepts_integers_and_floats() {
        assert!(coerce(FieldKind::NumSeq, &yaml("[0, 3.4, 8]")).is_ok());
        assert!(coerce(FieldKind::NumSeq, &yaml("[0, fast]")).is_err());
    }

    #[test]
    fn test_pixel_list_forms() {
        assert_eq!(
            coerce(FieldKind::Pixels, &yaml("All")),
            Ok(Value::String("all".to_string()))
        );
        assert!(coerce(FieldKind::Pixels, &yaml("[1, 2, 3]")).is_ok());
        assert!(coerce(FieldKind::Pixels, &yaml("[1, -2]")).is_err());
        assert!(coerce(FieldKind::Pixels, &yaml("none")).is_err());
        assert_eq!(
            coerce(FieldKind::Pixels, &yaml("[1, 5000000000]")),
            Err("sequence with integer 5000000000 out of range at index 1".to_string())
        );
    }

    #[test]
    fn test_pixel_count_is_bounded() {
        assert_eq!(
            coerce(FieldKind::PixelCount, &yaml("1296")),
            Ok(Value::Number(Number::from(1296u64)))
        );
        assert!(coerce(FieldKind::PixelCount, &yaml("65536")).is_ok());
        assert_eq!(
            coerce(FieldKind::PixelCount, &yaml("5000000000")),
            Err("integer 5000000000 above 65536".to_string())
        );
        assert!(coerce(FieldKind::PixelCount, &yaml("-1")).is_err());
    }

    #[test]
    fn test_oversized_n_pixels_is_type_mismatch() {
        let source = format!("{}n_pixels: 5000000000\n", GENERIC);
        match check_document("test.yaml", mapping(&source), ConfigTheme::Generic) {
            Err(ConfigError::TypeMismatch { key, expected, .. }) => {
                assert_eq!(key, "n_pixels");
                assert_eq!(expected, "pixel count between 0 and 65536");
            }
            other => panic!("Expected TypeMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_histo_filename_sibling_must_be_string() {
        let source = format!("{}synch_histo_filename: 12\n", GENERIC);
        let result = check_document("test.yaml", mapping(&source), ConfigTheme::Generic);
        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch { ref key, .. }) if key == "synch_histo_filename"
        ));
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let source = format!("{}max_time: 1000\n", GENERIC);
        let checked = check_document("test.yaml", mapping(&source), ConfigTheme::Generic).unwrap();
        assert_eq!(checked.get("max_time"), Some(&Value::Number(1000.into())));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let result = into_mapping("test.yaml", yaml("[1, 2, 3]"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_keys_must_be_strings() {
        let result = into_mapping("test.yaml", yaml("1: one\n"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_analysis_module_type_checked() {
        let doc = mapping("analysis_module: [a, b]\n");
        assert!(matches!(
            analysis_module("test.yaml", &doc),
            Err(ConfigError::TypeMismatch { .. })
        ));
        let doc = mapping("directory: /data\n");
        assert!(matches!(
            analysis_module("test.yaml", &doc),
            Err(ConfigError::MissingKey { .. })
        ));
    }
}
