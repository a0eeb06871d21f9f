use image::ImageReader;
use std::error::Error;
use std::path::Path;
use traxis::{AnalysisConfig, ReferenceLine, TrackAnalyzer, TrackPoint};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <config.json> <points.json> [image.png dl_px]",
            args[0]
        );
        std::process::exit(2);
    }

    let config = AnalysisConfig::from_json_file(Path::new(&args[1]))?;
    let points: Vec<TrackPoint> = serde_json::from_str(&std::fs::read_to_string(&args[2])?)?;

    let analyzer = TrackAnalyzer::with_config(config);
    let track = analyzer.measure(&points)?;
    println!(
        "Radius {:.2} ± {:.2} px, momentum {:.2} ± {:.2} (stat) ± {:.2} (cal) MeV/c",
        track.circle.radius,
        track.circle.radius_err,
        track.momentum.momentum,
        track.momentum.stat_error,
        track.momentum.cal_error
    );

    if track.arc.is_some() {
        let angle = analyzer.opening_angle(&track, &points, &ReferenceLine::polar_axis())?;
        println!(
            "Opening angle {:.2} ± {:.2} deg",
            angle.angle.angle, angle.angle.error
        );
    }

    if let (Some(image_path), Some(dl)) = (args.get(3), args.get(4)) {
        let image = ImageReader::open(image_path)?.decode()?.to_luma8();
        let density = analyzer.optical_density(&track, &image, dl.parse()?)?;
        println!(
            "Optical density {:.5} ± {:.5} 1/cm over {} px",
            density.density.density, density.density.density_error, density.blackness.n_pixels
        );
    }
    Ok(())
}
