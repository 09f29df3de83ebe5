//! PNG bar charts for the funnel and intent sections.

use crate::funnel;
use crate::models::{FunnelStep, IntentSummary};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const CHART_SIZE: (u32, u32) = (800, 500);
const MAX_LABEL_LEN: usize = 14;

/// Grouped bars: one group per step, one bar per device.
///
/// Steps follow `step_order`; steps absent from `steps` get no group.
pub fn render_funnel_chart(steps: &[FunnelStep], step_order: &[String], path: &Path) -> Result<()> {
    let present: Vec<&str> = step_order
        .iter()
        .map(String::as_str)
        .filter(|name| steps.iter().any(|s| s.step == *name))
        .collect();
    let devices = funnel::devices(steps);

    // each step group has one slot per device plus a gap
    let slots_per_step = devices.len() + 1;
    let total_slots = (present.len() * slots_per_step) as i32;
    let label_slot = devices.len().saturating_sub(1) / 2;
    let y_max = headroom(steps.iter().map(|s| s.users).max().unwrap_or(0));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Funnel conversion by step and device", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..total_slots).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(total_slots as usize)
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(slot) if *slot as usize % slots_per_step == label_slot => present
                .get(*slot as usize / slots_per_step)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("Users")
        .draw()?;

    for (d_idx, device) in devices.iter().enumerate() {
        let color = Palette99::pick(d_idx).mix(0.9);
        let bars: Vec<_> = steps
            .iter()
            .filter(|s| s.device == *device)
            .filter_map(|s| {
                let pos = present.iter().position(|p| *p == s.step)?;
                let slot = (pos * slots_per_step + d_idx) as i32;
                Some(Rectangle::new(
                    [
                        (SegmentValue::Exact(slot), 0),
                        (SegmentValue::Exact(slot + 1), s.users),
                    ],
                    color.filled(),
                ))
            })
            .collect();

        chart
            .draw_series(bars)?
            .label(*device)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    info!("Funnel chart saved to {}", path.display());
    Ok(())
}

/// One bar per intent, in the given order.
pub fn render_intent_chart(intents: &[IntentSummary], title: &str, path: &Path) -> Result<()> {
    let n = intents.len() as i32;
    let y_max = headroom(intents.iter().map(|i| i.count).max().unwrap_or(0));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0u64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(intents.len())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => intents
                .get(*i as usize)
                .map(|it| shorten(&it.intent, MAX_LABEL_LEN))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("Count")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(8)
            .data(intents.iter().enumerate().map(|(i, it)| (i as i32, it.count))),
    )?;

    root.present()?;
    info!("Intent chart saved to {}", path.display());
    Ok(())
}

/// Axis top with ~10% room above the tallest bar
fn headroom(max: u64) -> u64 {
    max + max / 10 + 1
}

fn shorten(label: &str, max_len: usize) -> String {
    if label.chars().count() > max_len {
        let head: String = label.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}
