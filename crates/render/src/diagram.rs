use crate::layout::{self, Point};
use anyhow::Result;
use extract::{EntityKind, KnowledgeGraph};
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

const WIDTH: u32 = 1600;
const HEIGHT: u32 = 1200;
const MARGIN: f64 = 90.0;
const NODE_RADIUS: i32 = 34;
const LAYOUT_ITERATIONS: usize = 50;

const COMPANY_COLOR: RGBColor = RGBColor(0x4A, 0x90, 0xE2);
const RISK_COLOR: RGBColor = RGBColor(0xE2, 0x4A, 0x4A);
const AMOUNT_COLOR: RGBColor = RGBColor(0x4A, 0xE2, 0x4A);
const FALLBACK_COLOR: RGBColor = RGBColor(0xE2, 0xE2, 0x4A);

fn kind_color(kind: EntityKind) -> RGBColor {
    match kind {
        EntityKind::Company => COMPANY_COLOR,
        EntityKind::RiskFactor => RISK_COLOR,
        EntityKind::Amount => AMOUNT_COLOR,
        EntityKind::Unknown => FALLBACK_COLOR,
    }
}

/// Edges whose endpoints both resolve to an entity, as indices into
/// `graph.entities`. Dangling relationships are dropped here, before any
/// drawing happens.
fn resolved_edges<'a>(graph: &'a KnowledgeGraph) -> Vec<(usize, usize, &'a str)> {
    let index: HashMap<&str, usize> = graph
        .entities
        .iter()
        .enumerate()
        .map(|(i, entity)| (entity.id.as_str(), i))
        .collect();

    graph
        .relationships
        .iter()
        .filter_map(|relationship| {
            let source = *index.get(relationship.source.as_str())?;
            let target = *index.get(relationship.target.as_str())?;
            Some((source, target, relationship.label.as_str()))
        })
        .collect()
}

fn to_pixels(point: Point) -> (i32, i32) {
    let x = MARGIN + point.x * (WIDTH as f64 - 2.0 * MARGIN);
    let y = MARGIN + point.y * (HEIGHT as f64 - 2.0 * MARGIN);
    (x as i32, y as i32)
}

/// Render the graph as a node-link PNG: force-directed layout, nodes colored
/// by kind, directed labeled edges. Relationships that point at ids missing
/// from the entity set are skipped, never an error.
pub fn render_diagram(graph: &KnowledgeGraph, path: &Path) -> Result<()> {
    let edges = resolved_edges(graph);
    let dangling = graph.relationships.len() - edges.len();
    if dangling > 0 {
        warn!(dangling, "skipping relationships with unresolved endpoints");
    }

    let edge_pairs: Vec<(usize, usize)> = edges.iter().map(|&(s, t, _)| (s, t)).collect();
    let positions = layout::spring_layout(graph.entities.len(), &edge_pairs, LAYOUT_ITERATIONS);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let title_style = ("sans-serif", 34)
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let legend_style = ("sans-serif", 20)
        .into_font()
        .color(&RGBColor(0x50, 0x50, 0x50))
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(
        "Financial Knowledge Graph",
        (WIDTH as i32 / 2, 14),
        title_style,
    ))?;
    root.draw(&Text::new(
        "(Blue=Company, Red=Risk, Green=Amount)",
        (WIDTH as i32 / 2, 52),
        legend_style,
    ))?;

    let edge_color = RGBColor(0x80, 0x80, 0x80);
    let edge_label_style = ("sans-serif", 15)
        .into_font()
        .color(&RGBColor(0x40, 0x40, 0x40))
        .pos(Pos::new(HPos::Center, VPos::Center));

    for &(source, target, label) in &edges {
        let (x1, y1) = to_pixels(positions[source]);
        let (x2, y2) = to_pixels(positions[target]);
        root.draw(&PathElement::new(
            vec![(x1, y1), (x2, y2)],
            edge_color.stroke_width(2),
        ))?;
        draw_arrowhead(&root, (x1, y1), (x2, y2), &edge_color)?;
        root.draw(&Text::new(
            label.to_string(),
            ((x1 + x2) / 2, (y1 + y2) / 2 - 10),
            edge_label_style.clone(),
        ))?;
    }

    let name_style = ("sans-serif", 17)
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let value_style = ("sans-serif", 15)
        .into_font()
        .color(&RGBColor(0x40, 0x40, 0x40))
        .pos(Pos::new(HPos::Center, VPos::Top));

    for (entity, &position) in graph.entities.iter().zip(&positions) {
        let (x, y) = to_pixels(position);
        let color = kind_color(entity.kind);
        root.draw(&Circle::new((x, y), NODE_RADIUS, color.mix(0.85).filled()))?;
        root.draw(&Circle::new((x, y), NODE_RADIUS, color.stroke_width(2)))?;

        let name: String = entity.name.chars().take(20).collect();
        root.draw(&Text::new(name, (x, y + NODE_RADIUS + 6), name_style.clone()))?;
        if let Some(value) = entity.value.as_ref().filter(|v| !v.is_null()) {
            let shown = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            root.draw(&Text::new(
                format!("({shown})"),
                (x, y + NODE_RADIUS + 26),
                value_style.clone(),
            ))?;
        }
    }

    root.present()?;
    info!(
        path = %path.display(),
        nodes = graph.entities.len(),
        edges = edges.len(),
        "saved graph visualization"
    );
    Ok(())
}

/// Small filled triangle at the target end of an edge, pulled back so it
/// sits on the node's rim rather than under it.
fn draw_arrowhead<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    from: (i32, i32),
    to: (i32, i32),
    color: &RGBColor,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    let length = (dx * dx + dy * dy).sqrt();
    if length < 1.0 {
        return Ok(());
    }
    let (ux, uy) = (dx / length, dy / length);
    let tip = (
        to.0 - (ux * NODE_RADIUS as f64) as i32,
        to.1 - (uy * NODE_RADIUS as f64) as i32,
    );
    let base = (
        tip.0 - (ux * 14.0) as i32,
        tip.1 - (uy * 14.0) as i32,
    );
    let (px, py) = (-uy, ux);
    let left = (base.0 + (px * 6.0) as i32, base.1 + (py * 6.0) as i32);
    let right = (base.0 - (px * 6.0) as i32, base.1 - (py * 6.0) as i32);
    root.draw(&Polygon::new(vec![tip, left, right], color.filled()))?;
    Ok(())
}
