use tracing::trace;

use crate::error::ConversionError;
use crate::models::{SalinityResult, SensorReading};
use crate::pressure::{DEFAULT_PRESSURE_DBAR, PressureEstimator};

/// Conductivity of standard seawater at S = 35, T = 15 °C, p = 0 (S/m).
pub const C_REF_S_PER_M: f64 = 4.2914;
/// mS/cm per S/m.
pub const MS_PER_CM_PER_S_PER_M: f64 = 10.0;

// Rp: pressure dependence of the conductivity ratio.
const A1: f64 = 2.070e-5;
const A2: f64 = -6.370e-10;
const A3: f64 = 3.989e-15;
const B1: f64 = 3.426e-2;
const B2: f64 = 4.464e-4;
const B3: f64 = 4.215e-1;
const B4: f64 = -3.107e-3;

// rT: conductivity ratio of standard seawater vs. temperature.
const C: [f64; 5] = [6.766097e-1, 2.00564e-2, 1.104259e-4, -6.9698e-7, 1.0031e-9];

// Salinity polynomial in sqrt(RT).
const A: [f64; 6] = [0.0080, -0.1692, 25.3851, 14.0941, -7.0261, 2.7081];
const B: [f64; 6] = [0.0005, -0.0056, -0.0066, -0.0375, 0.0636, -0.0144];
const K: f64 = 0.0162;

/// Temperature span (°C) over which the PSS-78 fit is accurate.
pub const VALID_TEMPERATURE_C: (f64, f64) = (-2.0, 35.0);

/// Intermediate quantities of one PSS-78 evaluation.
///
/// - `r`: conductivity ratio against standard seawater
/// - `rp`: pressure correction factor
/// - `rt_temp`: standard-seawater ratio at the sample temperature (`rT`)
/// - `rt`: fully compensated ratio (`RT`)
/// - `f_t`: temperature weighting of the ΔS polynomial
/// - `uncorrected`: `S0 + f(T)·S1` before the low-salinity correction
/// - `correction`: amount subtracted by the low-salinity correction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SalinityTerms {
    pub r: f64,
    pub rp: f64,
    pub rt_temp: f64,
    pub rt: f64,
    pub f_t: f64,
    pub uncorrected: f64,
    pub correction: f64,
    pub salinity: f64,
}

/// Conductivity (mS/cm) → conductivity ratio against standard seawater.
pub fn conductivity_ratio(conductivity_ms_cm: f64) -> f64 {
    (conductivity_ms_cm / MS_PER_CM_PER_S_PER_M) / C_REF_S_PER_M
}

/// `rT`: ratio of standard seawater conductivity at `temp` to that at 15 °C.
pub fn temperature_factor(temp: f64) -> f64 {
    C[0] + temp * (C[1] + temp * (C[2] + temp * (C[3] + temp * C[4])))
}

/// `Rp`: pressure correction of the conductivity ratio.
pub fn pressure_factor(r: f64, temp: f64, p_dbar: f64) -> f64 {
    let p = p_dbar;
    1.0 + p * (A1 + p * (A2 + p * A3)) / (1.0 + temp * (B1 + B2 * temp) + r * (B3 + B4 * temp))
}

fn poly_sqrt(coeffs: &[f64; 6], sqrt_rt: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * sqrt_rt + c)
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConversionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConversionError::invalid(
            field,
            format!("not a finite number: {value}"),
        ))
    }
}

/// Practical salinity with all intermediate terms.
///
/// Errors with `InvalidInput` when an input is not finite, the pressure is
/// negative, or the compensated ratio `RT` is negative or undefined;
/// fractional powers of `RT` would otherwise be NaN.
pub fn practical_salinity_detailed(
    conductivity: f64,
    temp: f64,
    p_dbar: f64,
) -> Result<SalinityTerms, ConversionError> {
    check_finite("conductivity", conductivity)?;
    check_finite("temperature", temp)?;
    check_finite("pressure", p_dbar)?;
    if p_dbar < 0.0 {
        return Err(ConversionError::invalid(
            "pressure",
            format!("must not be negative: {p_dbar} dbar"),
        ));
    }

    let r = conductivity_ratio(conductivity);
    let rp = pressure_factor(r, temp, p_dbar);
    let rt_temp = temperature_factor(temp);
    let rt = r / (rt_temp * rp);

    if !rt.is_finite() || rt < 0.0 {
        return Err(ConversionError::invalid(
            "conductivity",
            format!(
                "compensated conductivity ratio RT={rt} is negative or undefined \
                 (conductivity={conductivity}, temperature={temp}, pressure={p_dbar})"
            ),
        ));
    }

    let sqrt_rt = rt.sqrt();
    let dt = temp - 15.0;
    let f_t = dt / (1.0 + K * dt);
    let uncorrected = poly_sqrt(&A, sqrt_rt) + f_t * poly_sqrt(&B, sqrt_rt);

    // Extension of PSS-78 below S = 2 (Hill et al., 1986).
    let x = 400.0 * rt;
    let y = 100.0 * rt;
    let sqrt_y = y.sqrt();
    let correction =
        A[0] / (1.0 + 1.5 * x + x * x) + B[0] * f_t / (1.0 + sqrt_y + y + y * sqrt_y);

    let salinity = uncorrected - correction;
    trace!(r, rp, rt_temp, rt, uncorrected, salinity, "pss-78 evaluated");

    Ok(SalinityTerms {
        r,
        rp,
        rt_temp,
        rt,
        f_t,
        uncorrected,
        correction,
        salinity,
    })
}

/// Practical salinity (PSU) from conductivity (mS/cm), temperature (°C) and
/// pressure (dbar).
pub fn practical_salinity(
    conductivity: f64,
    temp: f64,
    p_dbar: f64,
) -> Result<f64, ConversionError> {
    practical_salinity_detailed(conductivity, temp, p_dbar).map(|t| t.salinity)
}

/// Converts readings to salinity, deriving pressure from latitude.
///
/// When built [`without_latitude`](Self::without_latitude) every reading is
/// converted at a fixed pressure and its latitude is ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct SalinityConverter {
    estimator: Option<PressureEstimator>,
    fixed_pressure_dbar: f64,
}

impl Default for SalinityConverter {
    fn default() -> Self {
        Self::new(PressureEstimator::default())
    }
}

impl SalinityConverter {
    pub fn new(estimator: PressureEstimator) -> Self {
        Self {
            estimator: Some(estimator),
            fixed_pressure_dbar: DEFAULT_PRESSURE_DBAR,
        }
    }

    pub fn without_latitude(pressure_dbar: f64) -> Self {
        Self {
            estimator: None,
            fixed_pressure_dbar: pressure_dbar,
        }
    }

    pub fn pressure_for(&self, latitude: f64) -> Result<f64, ConversionError> {
        match &self.estimator {
            Some(est) => est.estimate(latitude),
            None => Ok(self.fixed_pressure_dbar),
        }
    }

    pub fn convert(&self, reading: &SensorReading) -> Result<SalinityResult, ConversionError> {
        let pressure_dbar = self.pressure_for(reading.latitude)?;
        let salinity =
            practical_salinity(reading.conductivity, reading.temperature, pressure_dbar)?;
        Ok(SalinityResult {
            reading: *reading,
            pressure_dbar,
            salinity,
        })
    }
}
