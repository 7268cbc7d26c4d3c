use window_detector::image::{GrayImageU8, ImageU8};
use window_detector::scorer::TemplateScorer;
use window_detector::{DetectError, MultiscaleDetector, ScanParams};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), DetectError> {
    // Demo stub: synthesizes a dark frame with one bright square and scans
    // it with a matching template.
    let w = 320usize;
    let h = 240usize;
    let mut gray = vec![20u8; w * h];
    for y in 100..148 {
        for x in 120..168 {
            gray[y * w + x] = 220;
        }
    }
    let img = ImageU8 {
        w,
        h,
        stride: w,
        data: &gray,
    };

    // Bright 16x16 blob on a dark surround; the square matches it once the
    // pyramid has shrunk the frame by about 3x.
    let template = GrayImageU8::from_fn(24, 24, |x, y| {
        if (4..20).contains(&x) && (4..20).contains(&y) {
            220
        } else {
            20
        }
    });

    let det = MultiscaleDetector::new(Box::new(TemplateScorer::new(template, 0.7)));
    let report = det.detect(&img, &ScanParams::default())?;

    println!(
        "detections={} raw={} windows={} total_ms={:.3}",
        report.detections.len(),
        report.stats.raw_candidates,
        report.stats.windows_evaluated,
        report.stats.timing.total_ms
    );
    for det in &report.detections {
        println!(
            "  ({}, {}) {}x{} weight={} score={:.3}",
            det.rect.x, det.rect.y, det.rect.width, det.rect.height, det.weight, det.score
        );
    }
    Ok(())
}
