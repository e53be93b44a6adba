use plotkit_camtools::{GeometryExtractor, PlotParameters};
use plotkit_core::{Point, ProcessingToken};

async fn extract(svg: &str) -> plotkit_camtools::ExtractedGeometry {
    GeometryExtractor::new(&PlotParameters::default())
        .extract(svg, &ProcessingToken::detached(None))
        .await
        .expect("extraction failed")
}

#[tokio::test]
async fn closed_primitives_extract_closed_polylines() {
    let geometry = extract(
        r#"<svg xmlns="http://www.w3.org/2000/svg">
            <rect x="0" y="0" width="20" height="10"/>
            <rect x="30" y="0" width="20" height="10" rx="3"/>
            <circle cx="5" cy="40" r="4"/>
            <ellipse cx="40" cy="40" rx="6" ry="2"/>
            <polygon points="60,0 70,0 65,8"/>
            <path d="M 80 0 A 5 5 0 1 1 80 10 Z"/>
        </svg>"#,
    )
    .await;

    assert_eq!(geometry.polylines.len(), 6);
    for polyline in &geometry.polylines {
        assert_eq!(
            polyline.first(),
            polyline.last(),
            "primitive {} is not closed",
            polyline.id
        );
    }
}

#[tokio::test]
async fn rounded_rect_stays_inside_its_box() {
    let geometry = extract(r#"<svg><rect x="0" y="0" width="20" height="10" rx="4" ry="2"/></svg>"#).await;
    let rect = &geometry.polylines[0];
    assert!(rect.points.len() > 5);
    for p in &rect.points {
        assert!(p.x >= -1e-9 && p.x <= 20.0 + 1e-9);
        assert!(p.y >= -1e-9 && p.y <= 10.0 + 1e-9);
    }
    // Corners are cut
    assert!(!rect.points.contains(&Point::new(0.0, 0.0)));
}

#[tokio::test]
async fn rotation_applies_to_every_point() {
    let geometry = extract(
        r#"<svg><g transform="rotate(90)"><line x1="0" y1="0" x2="10" y2="0"/></g></svg>"#,
    )
    .await;
    let end = geometry.polylines[0].last();
    assert!(end.x.abs() < 1e-9);
    assert!((end.y - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn document_order_is_preserved() {
    let geometry = extract(
        r#"<svg>
            <line x1="50" y1="0" x2="60" y2="0"/>
            <g><line x1="0" y1="0" x2="1" y2="0"/></g>
            <polyline points="5,5 6,6 7,5"/>
        </svg>"#,
    )
    .await;
    let ids: Vec<usize> = geometry.polylines.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(geometry.polylines[0].first(), Point::new(50.0, 0.0));
}

#[tokio::test]
async fn relative_path_commands() {
    let geometry = extract(r#"<svg><path d="m 10 10 l 5 0 v 5 h -5"/></svg>"#).await;
    let path = &geometry.polylines[0];
    assert_eq!(path.first(), Point::new(10.0, 10.0));
    assert_eq!(path.last(), Point::new(10.0, 15.0));
    assert!(!path.is_closed());
}

#[tokio::test]
async fn degenerate_primitives_are_skipped() {
    let geometry = extract(
        r#"<svg>
            <rect width="0" height="10"/>
            <circle r="0"/>
            <polyline points="1,1"/>
            <path d="M 3 3"/>
        </svg>"#,
    )
    .await;
    assert!(geometry.polylines.is_empty());
}
