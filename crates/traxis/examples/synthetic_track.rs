use image::{GrayImage, Luma};
use traxis::{
    blackness_over_arc, fit_circle, momentum, tangent_at, ArcSpan, Calibration, Designation,
    OpticalDensity, ReferenceLine, TrackPoint,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Markers along a 300 px arc sweeping 40..140 deg around (400, 400).
    let (cx, cy, r) = (400.0f64, 400.0f64, 300.0f64);
    let mut points: Vec<TrackPoint> = (0..9)
        .map(|i| {
            let t = (40.0 + 12.5 * i as f64).to_radians();
            TrackPoint::new(cx + r * t.cos(), cy - r * t.sin())
        })
        .collect();
    points[0].designation = Designation::Start;
    points[8].designation = Designation::End;

    // Film with the track drawn as a dark ring.
    let film = GrayImage::from_fn(800, 800, |x, y| {
        let d = ((x as f64 + 0.5 - cx).powi(2) + (y as f64 + 0.5 - cy).powi(2)).sqrt();
        if (d - r).abs() <= 2.0 {
            Luma([40u8])
        } else {
            Luma([250u8])
        }
    });

    let cal = Calibration {
        cm_per_px: 0.01,
        cm_per_px_error: 0.0002,
        momentum_per_px: 0.35,
        momentum_cal_fraction: 0.03,
    };

    let circle = fit_circle(&points)?;
    let p = momentum(circle.radius, circle.radius_err, &cal)?;
    println!("circle: {:?}", circle);
    println!("momentum: {:?}", p);

    let arc = ArcSpan::from_markers(&circle, &points)?;
    let tangent = tangent_at(&circle, &points[0])?.oriented(arc.direction());
    let angle = tangent.opening_angle(&ReferenceLine::new([0.0, 0.0], [1.0, 0.0]))?;
    println!("arc: {:?}", arc);
    println!("opening angle: {:.2} ± {:.2} deg", angle.angle, angle.error);

    let length = cal.track_length(&circle, arc.span_angle);
    let blackness = blackness_over_arc(&film, &circle, 8.0, arc.start_angle, arc.span_angle)?;
    let density = OpticalDensity::from_blackness(&blackness, &length)?;
    println!(
        "length {:.3} ± {:.3} cm, density {:.1} ± {:.1} 1/cm",
        length.cm, length.cm_error, density.density, density.density_error
    );
    Ok(())
}
