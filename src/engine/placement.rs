//! Spatial placement of answer widgets
//!
//! Two steps:
//! 1. `distribute` spreads widget ids over the zones (every zone gets one
//!    first when there are enough widgets).
//! 2. `place_within_zone` drops each zone's widgets on shuffled grid slots and
//!    nudges them by a jitter small enough that a widget never leaves its cell.
//!
//! Zone-local coordinates: origin at the zone center, +y up, row 0 on top.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::shuffle;
use crate::error::QuizError;
use crate::settings::OverflowPolicy;

/// A rectangular drop area, sized by the host for the current question
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: usize,
    pub size: Vec2,
    pub columns: u32,
    pub rows: u32,
}

impl Zone {
    pub fn new(id: usize, size: Vec2, columns: u32, rows: u32) -> Self {
        Self {
            id,
            size,
            columns,
            rows,
        }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        cell_size(self.size, self.columns, self.rows)
    }
}

/// Where one widget ended up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub widget_id: usize,
    pub zone_id: usize,
    /// Grid slot (row * columns + col)
    pub slot_index: usize,
    /// Slot center in zone-local coordinates
    pub center: Vec2,
    /// Jitter applied on top of the slot center
    pub offset: Vec2,
}

impl Placement {
    /// Final widget position in zone-local coordinates
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.center + self.offset
    }
}

/// Result of laying out one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneLayout {
    pub zone_id: usize,
    pub columns: u32,
    /// Rows actually used (more than configured under `OverflowPolicy::Grow`)
    pub rows: u32,
    pub cell_size: Vec2,
    pub max_jitter: Vec2,
    pub placements: Vec<Placement>,
    /// Widgets that did not fit under `OverflowPolicy::Drop`
    pub dropped: Vec<usize>,
}

#[inline]
fn cell_size(size: Vec2, columns: u32, rows: u32) -> Vec2 {
    if columns == 0 || rows == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(size.x / columns as f32, size.y / rows as f32)
}

/// Largest jitter per axis that keeps a widget (plus margin) inside its cell
///
/// A mirrored widget (negative extent) takes as much room as the unmirrored one.
#[inline]
pub fn max_jitter(cell: Vec2, widget: Vec2, margin: f32) -> Vec2 {
    ((cell - widget.abs()) * 0.5 - Vec2::splat(margin)).max(Vec2::ZERO)
}

/// Slot centers for a centered grid, in slot-index order (row-major, top row first)
pub fn slot_centers(size: Vec2, columns: u32, rows: u32) -> Vec<Vec2> {
    let cell = cell_size(size, columns, rows);
    let half = size * 0.5;

    let mut centers = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for col in 0..columns {
            let x = -half.x + cell.x * (col as f32 + 0.5);
            let y = half.y - cell.y * (row as f32 + 0.5);
            centers.push(Vec2::new(x, y));
        }
    }
    centers
}

/// Assign widget ids `0..widget_count` to zones `0..zone_count`
///
/// With at least as many widgets as zones every zone is guaranteed one widget;
/// the leftovers land in uniformly random zones.
pub fn distribute<R: Rng + ?Sized>(
    widget_count: usize,
    zone_count: usize,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>, QuizError> {
    if zone_count == 0 {
        return Err(QuizError::MissingZones);
    }

    let mut widgets: Vec<usize> = (0..widget_count).collect();
    shuffle(&mut widgets, rng);

    let mut zones = vec![Vec::new(); zone_count];
    let mut rest = widgets.as_slice();

    if widget_count >= zone_count {
        let (first, tail) = widgets.split_at(zone_count);
        for (zone, &widget) in zones.iter_mut().zip(first) {
            zone.push(widget);
        }
        rest = tail;
    }

    for &widget in rest {
        let zone = rng.random_range(0..zone_count);
        zones[zone].push(widget);
    }

    Ok(zones)
}

/// Place `widget_ids` (already in random order) on shuffled grid slots of `zone`
pub fn place_within_zone<R: Rng + ?Sized>(
    widget_ids: &[usize],
    zone: &Zone,
    widget_size: Vec2,
    margin: f32,
    overflow: OverflowPolicy,
    rng: &mut R,
) -> Result<ZoneLayout, QuizError> {
    let widget_size = widget_size.abs();
    let columns = zone.columns;
    let mut rows = zone.rows;
    let capacity = zone.slot_count();

    if widget_ids.len() > capacity {
        match overflow {
            OverflowPolicy::Drop => {}
            OverflowPolicy::Grow if columns > 0 => {
                let needed = widget_ids.len().div_ceil(columns as usize) as u32;
                log::debug!("Zone {} grows from {} to {} rows", zone.id, rows, needed);
                rows = needed;
            }
            OverflowPolicy::Grow | OverflowPolicy::Reject => {
                return Err(QuizError::ZoneOverflow {
                    zone_id: zone.id,
                    widgets: widget_ids.len(),
                    slots: capacity,
                });
            }
        }
    }

    let cell = cell_size(zone.size, columns, rows);
    let jitter = max_jitter(cell, widget_size, margin);

    let mut layout = ZoneLayout {
        zone_id: zone.id,
        columns,
        rows,
        cell_size: cell,
        max_jitter: jitter,
        placements: Vec::new(),
        dropped: Vec::new(),
    };

    if widget_ids.is_empty() {
        return Ok(layout);
    }

    if widget_size.x > cell.x || widget_size.y > cell.y {
        log::warn!(
            "Zone {}: widget {:?} is larger than its cell {:?}, neighbours may overlap",
            zone.id,
            widget_size,
            cell
        );
    }

    let centers = slot_centers(zone.size, columns, rows);
    let mut slots: Vec<usize> = (0..centers.len()).collect();
    shuffle(&mut slots, rng);

    let count = widget_ids.len().min(slots.len());
    for (&widget_id, &slot_index) in widget_ids.iter().zip(&slots).take(count) {
        let offset = Vec2::new(
            jitter_within(jitter.x, rng),
            jitter_within(jitter.y, rng),
        );
        layout.placements.push(Placement {
            widget_id,
            zone_id: zone.id,
            slot_index,
            center: centers[slot_index],
            offset,
        });
    }

    layout.dropped = widget_ids[count..].to_vec();
    if !layout.dropped.is_empty() {
        log::warn!(
            "Zone {} has {} slots, dropping widgets {:?}",
            zone.id,
            slots.len(),
            layout.dropped
        );
    }

    Ok(layout)
}

#[inline]
fn jitter_within<R: Rng + ?Sized>(bound: f32, rng: &mut R) -> f32 {
    if bound > 0.0 {
        rng.random_range(-bound..=bound)
    } else {
        0.0
    }
}

/// Distribute `widget_count` widgets over `zones` and place them
pub fn layout<R: Rng + ?Sized>(
    widget_count: usize,
    zones: &[Zone],
    widget_size: Vec2,
    margin: f32,
    overflow: OverflowPolicy,
    rng: &mut R,
) -> Result<Vec<ZoneLayout>, QuizError> {
    let assignment = distribute(widget_count, zones.len(), rng)?;

    zones
        .iter()
        .zip(&assignment)
        .map(|(zone, widgets)| place_within_zone(widgets, zone, widget_size, margin, overflow, rng))
        .collect()
}
