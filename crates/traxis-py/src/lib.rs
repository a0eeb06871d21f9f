use image::GrayImage;
use numpy::{PyReadonlyArrayDyn, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;

use traxis::{AnalysisConfig, ReferenceLine, TrackAnalyzer, TrackMeasurement, TrackPoint};

fn py_value_error<E: std::fmt::Display>(err: E) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn config_from_json(config_json: &str) -> PyResult<AnalysisConfig> {
    AnalysisConfig::from_json_str(config_json).map_err(py_value_error)
}

fn points_from_json(points_json: &str) -> PyResult<Vec<TrackPoint>> {
    serde_json::from_str(points_json).map_err(py_value_error)
}

fn track_from_json(track_json: &str) -> PyResult<TrackMeasurement> {
    serde_json::from_str(track_json).map_err(py_value_error)
}

fn load_gray_image(path: &str) -> PyResult<GrayImage> {
    image::open(path)
        .map(|img| img.to_luma8())
        .map_err(|e| py_value_error(format!("failed to open image '{path}': {e}")))
}

fn rgb_to_luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let y = 77u32 * r as u32 + 150u32 * g as u32 + 29u32 * b as u32 + 128u32;
    (y >> 8) as u8
}

fn gray_image_from_array(array: PyReadonlyArrayDyn<'_, u8>) -> PyResult<GrayImage> {
    let shape = array.shape();
    let view = array.as_array();

    let (h, w) = match shape {
        [h, w] | [h, w, 3] | [h, w, 4] => (*h, *w),
        _ => {
            return Err(PyTypeError::new_err(
                "expected image array with shape (H, W) or (H, W, 3|4)",
            ))
        }
    };
    let color = shape.len() == 3;
    let mut out = Vec::with_capacity(h.saturating_mul(w));
    for y in 0..h {
        for x in 0..w {
            out.push(if color {
                rgb_to_luma_u8(view[[y, x, 0]], view[[y, x, 1]], view[[y, x, 2]])
            } else {
                view[[y, x]]
            });
        }
    }
    GrayImage::from_raw(w as u32, h as u32, out)
        .ok_or_else(|| PyRuntimeError::new_err("failed to build grayscale image"))
}

/// Measurement core bound to one analysis configuration.
///
/// Records cross the boundary as JSON strings; images as file paths or
/// numpy arrays.
#[pyclass(module = "traxis._traxis")]
struct MeasureCore {
    analyzer: TrackAnalyzer,
}

#[pymethods]
impl MeasureCore {
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        Ok(Self {
            analyzer: TrackAnalyzer::with_config(config_from_json(config_json)?),
        })
    }

    fn config_json(&self) -> PyResult<String> {
        serde_json::to_string(self.analyzer.config()).map_err(py_value_error)
    }

    fn measure(&self, points_json: &str) -> PyResult<String> {
        let points = points_from_json(points_json)?;
        let track = self.analyzer.measure(&points).map_err(py_value_error)?;
        serde_json::to_string(&track).map_err(py_value_error)
    }

    #[pyo3(signature = (track_json, points_json, reference_json=None))]
    fn opening_angle(
        &self,
        track_json: &str,
        points_json: &str,
        reference_json: Option<&str>,
    ) -> PyResult<String> {
        let track = track_from_json(track_json)?;
        let points = points_from_json(points_json)?;
        let reference = match reference_json {
            Some(s) => serde_json::from_str::<ReferenceLine>(s).map_err(py_value_error)?,
            None => ReferenceLine::polar_axis(),
        };
        let angle = self
            .analyzer
            .opening_angle(&track, &points, &reference)
            .map_err(py_value_error)?;
        serde_json::to_string(&angle).map_err(py_value_error)
    }

    fn optical_density_path(&self, track_json: &str, image_path: &str, dl: f64) -> PyResult<String> {
        let track = track_from_json(track_json)?;
        let gray = load_gray_image(image_path)?;
        let density = self
            .analyzer
            .optical_density(&track, &gray, dl)
            .map_err(py_value_error)?;
        serde_json::to_string(&density).map_err(py_value_error)
    }

    fn optical_density_array(
        &self,
        track_json: &str,
        image: PyReadonlyArrayDyn<'_, u8>,
        dl: f64,
    ) -> PyResult<String> {
        let track = track_from_json(track_json)?;
        let gray = gray_image_from_array(image)?;
        let density = self
            .analyzer
            .optical_density(&track, &gray, dl)
            .map_err(py_value_error)?;
        serde_json::to_string(&density).map_err(py_value_error)
    }
}

#[pyfunction]
fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&AnalysisConfig::default()).map_err(py_value_error)
}

#[pyfunction]
#[pyo3(signature = (overlay_json=None))]
fn resolve_config_json(overlay_json: Option<&str>) -> PyResult<String> {
    let config = config_from_json(overlay_json.unwrap_or("{}"))?;
    serde_json::to_string(&config).map_err(py_value_error)
}

#[pyfunction]
fn load_config_json(path: &str) -> PyResult<String> {
    let config =
        AnalysisConfig::from_json_file(std::path::Path::new(path)).map_err(py_value_error)?;
    serde_json::to_string(&config).map_err(py_value_error)
}

#[pyfunction]
#[pyo3(signature = (points_json, config_json=None))]
fn fit_circle_json(points_json: &str, config_json: Option<&str>) -> PyResult<String> {
    let config = config_from_json(config_json.unwrap_or("{}"))?;
    let points = points_from_json(points_json)?;
    let circle = traxis::fit_circle_with(&points, &config.fit).map_err(py_value_error)?;
    serde_json::to_string(&circle).map_err(py_value_error)
}

#[pymodule]
fn _traxis(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<MeasureCore>()?;

    m.add_function(wrap_pyfunction!(package_version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(load_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(fit_circle_json, m)?)?;
    Ok(())
}
