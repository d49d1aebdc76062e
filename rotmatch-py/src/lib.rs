//! Python bindings for the rotmatch rotated template matcher.
//!
//! This module exposes the coarse-to-fine matcher to Python via PyO3.

use numpy::{PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use rotmatch::{
    EdgeConfig as RustEdgeConfig, EdgeMode, ImageView, MatchConfig as RustMatchConfig,
    MatchReport as RustMatchReport, Matcher as RustMatcher, RotMatchError,
    ShiftValue as RustShiftValue, Template as RustTemplate,
};

/// Convert a RotMatchError to a Python exception.
fn to_py_err(err: RotMatchError) -> PyErr {
    match err {
        RotMatchError::InvalidInput(_)
        | RotMatchError::AngleOutOfRange { .. }
        | RotMatchError::InvalidDimensions { .. }
        | RotMatchError::TemplateLargerThanImage { .. } => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn view_from_array<'a>(array: &'a PyReadonlyArray2<'_, u8>) -> PyResult<ImageView<'a, u8>> {
    let shape = array.shape();
    let height = shape[0];
    let width = shape[1];
    let data = array.as_slice()?;
    ImageView::from_slice(data, width, height).map_err(to_py_err)
}

/// Rigid transform: template center and rotation angle.
#[pyclass]
#[derive(Clone)]
pub struct ShiftValue {
    /// Center x coordinate.
    #[pyo3(get)]
    pub x: f64,
    /// Center y coordinate.
    #[pyo3(get)]
    pub y: f64,
    /// Rotation angle in degrees.
    #[pyo3(get)]
    pub angle_deg: f64,
}

#[pymethods]
impl ShiftValue {
    fn __repr__(&self) -> String {
        format!(
            "ShiftValue(x={:.2}, y={:.2}, angle_deg={:.2})",
            self.x, self.y, self.angle_deg
        )
    }
}

impl From<RustShiftValue> for ShiftValue {
    fn from(s: RustShiftValue) -> Self {
        Self {
            x: s.x,
            y: s.y,
            angle_deg: s.angle_deg,
        }
    }
}

/// Pipeline result with the per-stage estimates.
#[pyclass]
#[derive(Clone)]
pub struct MatchReport {
    /// Final estimate in absolute image coordinates.
    #[pyo3(get)]
    pub result: ShiftValue,
    /// Coarse estimate at full resolution, relative to the image center.
    #[pyo3(get)]
    pub coarse: ShiftValue,
    /// Fine estimate relative to the refine window center.
    #[pyo3(get)]
    pub fine: ShiftValue,
    #[pyo3(get)]
    pub depth: usize,
    #[pyo3(get)]
    pub coarse_score: f32,
    #[pyo3(get)]
    pub fine_score: f32,
    /// Refine window as (x, y, width, height).
    #[pyo3(get)]
    pub window: (usize, usize, usize, usize),
}

#[pymethods]
impl MatchReport {
    fn __repr__(&self) -> String {
        format!(
            "MatchReport(result={}, depth={}, fine_score={:.4})",
            self.result.__repr__(),
            self.depth,
            self.fine_score
        )
    }
}

impl From<RustMatchReport> for MatchReport {
    fn from(r: RustMatchReport) -> Self {
        Self {
            result: r.result.into(),
            coarse: r.coarse.into(),
            fine: r.fine.into(),
            depth: r.depth,
            coarse_score: r.coarse_score,
            fine_score: r.fine_score,
            window: (r.window.x, r.window.y, r.window.width, r.window.height),
        }
    }
}

/// Configuration for the coarse-to-fine matcher.
#[pyclass]
#[derive(Clone)]
pub struct MatchConfig {
    inner: RustMatchConfig,
}

#[pymethods]
impl MatchConfig {
    /// Create a new MatchConfig.
    ///
    /// Args:
    ///     min_pyramid_len: Minimum coarse template dimension (default: 20)
    ///     coarse_step_deg: Coarse angle step in degrees (default: 0.5)
    ///     fine_range_factor: Fine half range in coarse steps (default: 1.5)
    ///     fine_step_factor: Fine step in coarse steps (default: 0.1)
    ///     roi_expand: Refine window expansion fraction (default: 0.2)
    ///     canny_low: Edge detector low threshold (default: 50)
    ///     canny_high: Edge detector high threshold (default: 150)
    ///     blur_width: Edge blur width (default: 3)
    ///     binary_edges: Use binarized Canny edges instead of graded ones (default: False)
    ///     min_var_i: Minimum image patch variance (default: 1e-8)
    ///     parallel: Evaluate angles in parallel (default: False)
    ///     interpolate_coarse_peaks: Rank coarse angles by sub-pixel peak height (default: True)
    #[new]
    #[pyo3(signature = (
        min_pyramid_len = 20,
        coarse_step_deg = 0.5,
        fine_range_factor = 1.5,
        fine_step_factor = 0.1,
        roi_expand = 0.2,
        canny_low = 50.0,
        canny_high = 150.0,
        blur_width = 3,
        binary_edges = false,
        min_var_i = 1e-8,
        parallel = false,
        interpolate_coarse_peaks = true
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        min_pyramid_len: usize,
        coarse_step_deg: f64,
        fine_range_factor: f64,
        fine_step_factor: f64,
        roi_expand: f64,
        canny_low: f32,
        canny_high: f32,
        blur_width: usize,
        binary_edges: bool,
        min_var_i: f32,
        parallel: bool,
        interpolate_coarse_peaks: bool,
    ) -> PyResult<Self> {
        let inner = RustMatchConfig {
            min_pyramid_len,
            coarse_step_deg,
            fine_range_factor,
            fine_step_factor,
            roi_expand,
            edge: RustEdgeConfig {
                mode: if binary_edges {
                    EdgeMode::Binary
                } else {
                    EdgeMode::Strength
                },
                low_threshold: canny_low,
                high_threshold: canny_high,
                blur_width,
                ..RustEdgeConfig::default()
            },
            min_var_i,
            parallel,
            interpolate_coarse_peaks,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "MatchConfig(coarse_step_deg={}, roi_expand={}, parallel={})",
            self.inner.coarse_step_deg, self.inner.roi_expand, self.inner.parallel
        )
    }
}

/// A grayscale template for matching.
#[pyclass]
pub struct Template {
    inner: RustTemplate,
}

#[pymethods]
impl Template {
    /// Create a template from a 2D numpy array.
    ///
    /// Args:
    ///     pixels: 2D uint8 numpy array (height x width)
    #[new]
    fn new(pixels: PyReadonlyArray2<'_, u8>) -> PyResult<Self> {
        let inner = RustTemplate::from_view(view_from_array(&pixels)?).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Load a template from an image file.
    ///
    /// Args:
    ///     path: Path to grayscale or RGB image file
    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        let owned = rotmatch::io::load_gray_image(path).map_err(to_py_err)?;
        Ok(Self {
            inner: RustTemplate::from(owned),
        })
    }

    /// Get template width.
    #[getter]
    fn width(&self) -> usize {
        self.inner.width()
    }

    /// Get template height.
    #[getter]
    fn height(&self) -> usize {
        self.inner.height()
    }

    fn __repr__(&self) -> String {
        format!("Template({}x{})", self.inner.width(), self.inner.height())
    }
}

/// Coarse-to-fine rotated template matcher.
#[pyclass]
pub struct Matcher {
    inner: RustMatcher,
}

#[pymethods]
impl Matcher {
    /// Create a matcher.
    ///
    /// Args:
    ///     config: MatchConfig (default: MatchConfig())
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<MatchConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner = RustMatcher::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Locate the template in an image.
    ///
    /// Args:
    ///     template: Template
    ///     image: 2D uint8 numpy array (height x width)
    ///     max_angle_deg: Half range of the angle search (default: 10)
    ///     score_threshold: Minimum fine score, None accepts any (default: None)
    ///
    /// Returns:
    ///     MatchReport with the final and per-stage estimates
    #[pyo3(signature = (template, image, max_angle_deg = 10.0, score_threshold = None))]
    fn match_image(
        &self,
        template: &Template,
        image: PyReadonlyArray2<'_, u8>,
        max_angle_deg: f64,
        score_threshold: Option<f32>,
    ) -> PyResult<MatchReport> {
        let view = view_from_array(&image)?;
        let report = self
            .inner
            .match_template_report(
                template.inner.view(),
                view,
                max_angle_deg,
                score_threshold.unwrap_or(f32::NEG_INFINITY),
            )
            .map_err(to_py_err)?;
        Ok(report.into())
    }

    fn __repr__(&self) -> String {
        "Matcher()".to_string()
    }
}

/// Convenience function to locate a template in an image.
///
/// Args:
///     image: 2D uint8 numpy array (height x width)
///     template: 2D uint8 numpy array (height x width)
///     max_angle_deg: Half range of the angle search (default: 10)
///     score_threshold: Minimum fine score, None accepts any (default: None)
///     parallel: Evaluate angles in parallel (default: False)
///
/// Returns:
///     ShiftValue with the template center and angle
#[pyfunction]
#[pyo3(signature = (image, template, max_angle_deg = 10.0, score_threshold = None, parallel = false))]
fn match_template(
    image: PyReadonlyArray2<'_, u8>,
    template: PyReadonlyArray2<'_, u8>,
    max_angle_deg: f64,
    score_threshold: Option<f32>,
    parallel: bool,
) -> PyResult<ShiftValue> {
    let matcher = RustMatcher::new(RustMatchConfig {
        parallel,
        ..RustMatchConfig::default()
    })
    .map_err(to_py_err)?;
    let result = matcher
        .match_template(
            view_from_array(&template)?,
            view_from_array(&image)?,
            max_angle_deg,
            score_threshold.unwrap_or(f32::NEG_INFINITY),
        )
        .map_err(to_py_err)?;
    Ok(result.into())
}

/// Python module for rotmatch.
#[pymodule]
fn _rotmatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ShiftValue>()?;
    m.add_class::<MatchReport>()?;
    m.add_class::<MatchConfig>()?;
    m.add_class::<Template>()?;
    m.add_class::<Matcher>()?;
    m.add_function(wrap_pyfunction!(match_template, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
