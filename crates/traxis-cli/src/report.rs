//! Console reports for measurement results.

use traxis::{AngleMeasurement, DensityMeasurement, TrackLength, TrackMeasurement};

pub fn fitted_circle(track: &TrackMeasurement) -> String {
    let c = &track.circle;
    let r = &track.radius_cm;
    format!(
        "---Fitted Circle---\n\
         Center (x coord):\t{:.5} +/- {:.5} [px]\n\
         Center (y coord):\t{:.5} +/- {:.5} [px]\n\
         Radius (px):\t{:.5} +/- {:.5} [px]\n\
         Radius (cm):\t{:.5} +/- {:.5} (Stat) +/- {:.5} (Cal) [cm]\n\
         RMS residual:\t{:.5} [px]\n",
        c.center_x,
        c.center_x_err,
        c.center_y,
        c.center_y_err,
        c.radius,
        c.radius_err,
        r.value,
        r.stat_error,
        r.cal_error,
        track.rms_residual
    )
}

pub fn momentum(track: &TrackMeasurement) -> String {
    let m = &track.momentum;
    format!(
        "---Track Momentum---\n\
         Track Momentum:\t{:.5} +/- {:.5} (Stat) +/- {:.5} (Cal) [MeV/c]\n",
        m.momentum, m.stat_error, m.cal_error
    )
}

pub fn track_length(length: &TrackLength) -> String {
    format!(
        "---Track Length---\n\
         Track Length (px):\t{:.5} [px]\n\
         Track Length (cm):\t{:.5} +/- {:.5} [cm]\n",
        length.pixels, length.cm, length.cm_error
    )
}

pub fn opening_angle(angle: &AngleMeasurement) -> String {
    format!(
        "---Opening Angle---\n\
         Opening Angle:\t{:.5} +/- {:.5} [deg]\n",
        angle.angle.angle, angle.angle.error
    )
}

pub fn optical_density(density: &DensityMeasurement) -> String {
    format!(
        "---Optical Density---\n\
         Optical density:\t{:.5} +/- {:.5} [1/cm] (with dL={})\n",
        density.density.density, density.density.density_error, density.dl
    )
}
