use plotkit_camtools::{PlotParameters, PlotPipeline, PlotResult};
use plotkit_core::{Point, ProcessingError, ProcessingToken, ToolpathEvent};

const DRAWING: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100">
    <g transform="translate(5,5)">
        <rect x="0" y="0" width="40" height="20"/>
        <circle cx="60" cy="30" r="10"/>
        <path d="M 0 50 C 10 40 20 60 30 50 S 50 60 60 50"/>
    </g>
    <polyline points="80,80 90,85 80,90"/>
</svg>"#;

async fn run(markup: &str, params: PlotParameters) -> Result<PlotResult, ProcessingError> {
    PlotPipeline::new(params)
        .run(markup, &ProcessingToken::detached(None))
        .await
}

#[tokio::test]
async fn single_line_produces_one_draw() {
    let params = PlotParameters {
        optimize_route: false,
        ..Default::default()
    };
    let result = run(r#"<svg><line x1="0" y1="0" x2="10" y2="0"/></svg>"#, params)
        .await
        .unwrap();

    let draws: Vec<&ToolpathEvent> = result
        .events
        .iter()
        .filter(|e| matches!(e, ToolpathEvent::Draw { .. }))
        .collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(
        draws[0],
        &ToolpathEvent::Draw {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0)
        }
    );
    assert_eq!(result.statistics.draw_length, 10.0);
    assert_eq!(result.statistics.travel_length, 0.0);
    assert!(result.gcode.contains("G1 X10.000 Y0.000 F1500"));
}

#[tokio::test]
async fn output_is_deterministic_without_optimization() {
    let params = PlotParameters {
        optimize_route: false,
        ..Default::default()
    };
    let first = run(DRAWING, params.clone()).await.unwrap();
    let second = run(DRAWING, params).await.unwrap();
    assert_eq!(first.gcode, second.gcode);
    assert_eq!(first.preview_svg, second.preview_svg);
    assert_eq!(first.statistics, second.statistics);
}

#[tokio::test]
async fn optimization_preserves_drawn_length() {
    // A zero threshold lifts the pen for every gap, so draw length is exactly
    // the summed segment length regardless of order.
    let base = PlotParameters {
        z_hop_threshold: 0.0,
        ..Default::default()
    };
    let plain = run(
        DRAWING,
        PlotParameters {
            optimize_route: false,
            ..base.clone()
        },
    )
    .await
    .unwrap();
    let optimized = run(DRAWING, base).await.unwrap();

    assert_eq!(plain.statistics.segment_count, optimized.statistics.segment_count);
    assert_eq!(plain.statistics.stroke_count, optimized.statistics.stroke_count);
    let difference = (plain.statistics.draw_length - optimized.statistics.draw_length).abs();
    assert!(difference < 1e-6, "draw length changed by {}", difference);
}

#[tokio::test]
async fn gcode_layout() {
    let result = run(DRAWING, PlotParameters::default()).await.unwrap();
    let lines: Vec<&str> = result
        .gcode
        .lines()
        .filter(|l| !l.starts_with(';'))
        .collect();

    assert!(lines[0].starts_with("G21"));
    assert!(lines[1].starts_with("G90"));
    assert!(lines[2].starts_with("G0 Z5.000"));
    assert_eq!(lines[3], "F1500");
    assert_eq!(&lines[lines.len() - 3..], &["G0 Z5.000", "G0 X0.000 Y0.000", "M2 ; End of program"]);

    let body = &lines[4..lines.len() - 3];
    assert_eq!(body.len(), result.events.len());
    assert!(body
        .iter()
        .all(|l| l.starts_with("G0 X") || l.starts_with("G1 X") || l.starts_with("G1 Z")));
}

#[tokio::test]
async fn auto_origin_and_preview_bounds() {
    let params = PlotParameters {
        auto_origin: true,
        margin: 10.0,
        units_per_physical_unit: 0.5,
        flip_vertical: true,
        ..Default::default()
    };
    let result = run(DRAWING, params).await.unwrap();
    assert_eq!(result.bounds.min_x, 10.0);
    assert_eq!(result.bounds.min_y, 10.0);
    assert!(result.preview_svg.contains(r#"viewBox="10.000 10.000"#));
    assert_eq!(result.preview_svg.matches("<polyline").count(), result.statistics.stroke_count);
}

#[tokio::test]
async fn errors_are_classified() {
    let err = run("<svg", PlotParameters::default()).await.unwrap_err();
    assert!(matches!(err, ProcessingError::Parse { .. }));
    assert!(err.user_message().unwrap().starts_with("Could not read the drawing"));

    let err = run("<svg><defs><circle r=\"5\"/></defs></svg>", PlotParameters::default())
        .await
        .unwrap_err();
    assert_eq!(err, ProcessingError::EmptyResult);
    assert_eq!(
        err.user_message().as_deref(),
        Some("Nothing drawable found in the input.")
    );
}

#[tokio::test]
async fn imperial_output() {
    let params = PlotParameters {
        units: plotkit_core::MeasurementSystem::Imperial,
        ..Default::default()
    };
    let result = run(DRAWING, params).await.unwrap();
    assert!(result.gcode.contains("G20"));
    assert!(!result.gcode.contains("G21"));
}
