// Assembles the chart document.

use poll_charts::geometry::{AxisTick, BarChart, Heatmap, PieChart, TextAnchor};
use serde_json::json;
use serde_json::Map as JSMap;

use crate::charts::config_reader::ReportConfig;
use crate::charts::*;

fn point_js(p: (f64, f64)) -> JSValue {
    json!([p.0, p.1])
}

fn axis_js(ticks: &[AxisTick]) -> Vec<JSValue> {
    ticks
        .iter()
        .map(|t| json!({"label": t.label, "position": t.position}))
        .collect()
}

fn party_values_js<T: Into<JSValue> + Copy>(values: &[(PartyId, T)]) -> JSMap<String, JSValue> {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (party, v) in values.iter() {
        m.insert(party.label().to_string(), (*v).into());
    }
    m
}

fn aggregates_js(seats: &AggregateCount, shares: &AggregateShare, regions: &RegionProfile) -> JSValue {
    let regions_js: Vec<JSValue> = regions
        .regions
        .iter()
        .map(|rm| json!({"region": rm.region, "means": party_values_js(&rm.means)}))
        .collect();
    json!({
        "seatsWon": party_values_js(&seats.ranked()),
        "voteShare": party_values_js(&shares.shares),
        "regions": regions_js,
    })
}

fn bar_js(chart: &BarChart) -> JSValue {
    let bars: Vec<JSValue> = chart
        .bars
        .iter()
        .map(|b| {
            json!({
                "party": b.party.label(),
                "count": b.count,
                "x": b.x,
                "y": b.y,
                "width": b.width,
                "height": b.height,
                "fill": b.fill,
                "highlight": b.highlight,
                "label": b.label,
                "labelPosition": point_js(b.label_pos),
            })
        })
        .collect();
    json!({
        "width": chart.width,
        "height": chart.height,
        "translate": point_js(chart.translate),
        "bars": bars,
        "xAxis": axis_js(&chart.x_axis),
        "yAxis": axis_js(&chart.y_axis),
    })
}

fn pie_js(chart: &PieChart) -> JSValue {
    let wedges: Vec<JSValue> = chart
        .wedges
        .iter()
        .map(|w| {
            let anchor = match w.text_anchor {
                TextAnchor::Start => "start",
                TextAnchor::End => "end",
            };
            let leader: Vec<JSValue> = w.leader.iter().map(|p| point_js(*p)).collect();
            json!({
                "party": w.party.label(),
                "share": w.share,
                "startAngle": w.start_angle,
                "endAngle": w.end_angle,
                "fill": w.fill,
                "highlight": w.highlight,
                "leaderLine": leader,
                "labelPosition": point_js(w.label_pos),
                "textAnchor": anchor,
                "label": w.label,
            })
        })
        .collect();
    json!({
        "width": chart.width,
        "height": chart.height,
        "translate": point_js(chart.translate),
        "radius": chart.radius,
        "wedges": wedges,
    })
}

fn heatmap_js(chart: &Heatmap) -> JSValue {
    let cells: Vec<JSValue> = chart
        .cells
        .iter()
        .map(|c| {
            json!({
                "party": c.party.label(),
                "region": c.region,
                "value": c.value,
                "x": c.x,
                "y": c.y,
                "width": c.width,
                "height": c.height,
                "fill": c.fill,
                "label": c.label,
                "labelPosition": point_js(c.label_pos),
            })
        })
        .collect();
    json!({
        "width": chart.width,
        "height": chart.height,
        "translate": point_js(chart.translate),
        "columns": axis_js(&chart.columns),
        "rows": axis_js(&chart.rows),
        "cells": cells,
    })
}

pub fn build_document_js(
    config: &ReportConfig,
    seats: &AggregateCount,
    shares: &AggregateShare,
    regions: &RegionProfile,
    bar: &BarChart,
    pie: &PieChart,
    heatmap: &Heatmap,
) -> JSValue {
    json!({
        "config": {
            "title": config.output_settings.title,
        },
        "aggregates": aggregates_js(seats, shares, regions),
        "charts": {
            "bar": bar_js(bar),
            "pie": pie_js(pie),
            "heatmap": heatmap_js(heatmap),
        },
    })
}
