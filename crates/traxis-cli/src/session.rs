//! Read-only loader for saved measurement sessions.
//!
//! A session file records the photograph, the markers with their
//! designations, the strip width and the reference line:
//!
//! ```json
//! {
//!   "imageFileName": "frame_0042.png",
//!   "points": [{"designation": "start", "x": 812.0, "y": 301.5}, ...],
//!   "dl": "6",
//!   "refInitialPoint": {"x": 10.0, "y": 700.0},
//!   "refFinalPoint": {"x": 900.0, "y": 700.0}
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use traxis::{Calibration, Designation, ReferenceLine, TrackPoint};

use crate::CliResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    image_file_name: Option<String>,
    #[serde(default)]
    points: Vec<SessionPoint>,
    #[serde(default)]
    dl: Option<serde_json::Value>,
    ref_initial_point: Option<SessionXY>,
    ref_final_point: Option<SessionXY>,
}

#[derive(Debug, Deserialize)]
struct SessionPoint {
    #[serde(default)]
    designation: Option<String>,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct SessionXY {
    x: f64,
    y: f64,
}

/// Inputs recovered from a session file.
#[derive(Debug, Clone)]
pub struct Session {
    /// Photograph path, resolved against the session file's directory.
    pub image: Option<PathBuf>,
    pub points: Vec<TrackPoint>,
    /// Strip width in pixels, when a valid one was saved.
    pub dl: Option<f64>,
    pub reference: ReferenceLine,
}

impl Session {
    pub fn from_json_file(path: &Path) -> CliResult<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read session {}: {}", path.display(), e))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json_str(&data, base)
    }

    pub fn from_json_str(data: &str, base_dir: &Path) -> CliResult<Self> {
        let raw: SessionFile =
            serde_json::from_str(data).map_err(|e| format!("invalid session JSON: {}", e))?;

        let image = raw
            .image_file_name
            .filter(|name| !name.is_empty())
            .map(|name| {
                let p = PathBuf::from(name);
                if p.is_absolute() {
                    p
                } else {
                    base_dir.join(p)
                }
            });

        let points = raw
            .points
            .iter()
            .map(|p| TrackPoint::designated(p.x, p.y, parse_designation(p.designation.as_deref())))
            .collect();

        let dl = match raw.dl {
            Some(serde_json::Value::String(s)) => match Calibration::parse_value("dl", &s) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("ignoring saved dl: {}", e);
                    None
                }
            },
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        };

        // A line is only restored when both ends were saved.
        let reference = match (raw.ref_initial_point, raw.ref_final_point) {
            (Some(a), Some(b)) => ReferenceLine::new([a.x, a.y], [b.x, b.y]),
            _ => ReferenceLine::polar_axis(),
        };

        Ok(Self {
            image,
            points,
            dl,
            reference,
        })
    }
}

fn parse_designation(text: Option<&str>) -> Designation {
    match text {
        Some("start") => Designation::Start,
        Some("end") => Designation::End,
        Some(other) => {
            tracing::warn!("unknown marker designation {:?}; treating as plain marker", other);
            Designation::None
        }
        None => Designation::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "imageFileName": "frame.png",
        "points": [
            {"designation": "start", "x": 10.0, "y": 0.0},
            {"designation": null, "x": 0.0, "y": 10.0},
            {"designation": "end", "x": -10.0, "y": 0.0}
        ],
        "dl": "4.5",
        "refInitialPoint": {"x": 0.0, "y": 50.0},
        "refFinalPoint": {"x": 100.0, "y": 50.0}
    }"#;

    #[test]
    fn parses_saved_session() {
        let s = Session::from_json_str(SAMPLE, Path::new("/data/run1")).unwrap();
        assert_eq!(s.image.unwrap(), PathBuf::from("/data/run1/frame.png"));
        assert_eq!(s.points.len(), 3);
        assert_eq!(s.points[0].designation, Designation::Start);
        assert_eq!(s.points[1].designation, Designation::None);
        assert_eq!(s.points[2].designation, Designation::End);
        assert_eq!(s.dl, Some(4.5));
        assert_eq!(s.reference.direction().unwrap(), [100.0, 0.0]);
    }

    #[test]
    fn bad_or_missing_fields_fall_back() {
        let s = Session::from_json_str(
            r#"{"points": [{"x": 1.0, "y": 2.0}], "dl": "abc", "refInitialPoint": {"x": 0, "y": 0}}"#,
            Path::new(""),
        )
        .unwrap();
        assert!(s.image.is_none());
        assert!(s.dl.is_none());
        assert_eq!(s.reference, ReferenceLine::polar_axis());
        assert_eq!(s.points[0].designation, Designation::None);
    }

    #[test]
    fn numeric_dl_is_accepted() {
        let s = Session::from_json_str(r#"{"dl": 3}"#, Path::new("")).unwrap();
        assert_eq!(s.dl, Some(3.0));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Session::from_json_str("{", Path::new("")).is_err());
    }
}
