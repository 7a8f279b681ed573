//! SVG rendering of a frame.

use crate::config::ChartConfig;
use crate::frame::Frame;

fn html_escape(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

/// Render `frame` as a standalone SVG document.
///
/// The ring is centred in a canvas with a margin around the chart area so
/// strokes are never clipped. Each arc carries its record id and instance
/// as data attributes so a client can route pointer events.
pub fn render_svg(frame: &Frame, chart: &ChartConfig) -> String {
    let (canvas_width, canvas_height) = chart.canvas_size();
    let (cx, cy) = chart.centre();

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{canvas_width}\" height=\"{canvas_height}\" data-frame=\"{}\"><g transform=\"translate({cx}, {cy})\">",
        frame.sequence
    );
    for shape in &frame.shapes {
        svg.push_str(&format!(
            "<path class=\"arc\" data-id=\"{}\" data-instance=\"{}\" d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"><title>{}: {}</title></path>",
            html_escape(shape.record_id.as_str()),
            shape.instance,
            html_escape(&shape.path),
            html_escape(&shape.fill),
            html_escape(&shape.stroke),
            shape.stroke_width,
            html_escape(&shape.name),
            shape.cost,
        ));
    }
    svg.push_str("</g></svg>");
    svg
}
