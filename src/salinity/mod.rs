//! PSS-78 practical salinity from conductivity, temperature and pressure.
//!
//! Implements the Practical Salinity Scale 1978 (UNESCO 1981, ITS-90
//! coefficients) together with the Hill et al. (1986) extension that keeps
//! salinity well behaved as conductivity approaches zero.
//!
//! Units: conductivity mS/cm, temperature °C, pressure dbar, salinity PSU.

pub mod calculator;
