//! Timer-driven controls: time travelling (the year slider steps forward) and
//! spatial travelling (the highlighted rank cycles).
//!
//! Timers run in the browser at the interval the server last returned; each
//! tick arrives as an ordinary dispatch of the tick counter.

use foundation::{Year, YearSpan};

use crate::controls::ControlState;
use crate::graph::CallbackId;

pub const ACTIVE_INTERVAL_MS: u64 = 2_000;
/// One day: effectively paused.
pub const INACTIVE_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;
pub const SPATIAL_TRAVEL_LABEL: &str = " Spatial Travelling ";

pub fn interval_for(checked: bool) -> u64 {
    if checked {
        ACTIVE_INTERVAL_MS
    } else {
        INACTIVE_INTERVAL_MS
    }
}

/// Year after one tick: the next year wrapping to the first, or unchanged
/// while time travelling is off.
pub fn advance_year(span: YearSpan, year: Year, auto: bool) -> Year {
    if !auto {
        return year;
    }
    span.next_wrapping(span.clamp(year))
}

/// Rank highlighted after `ticks` spatial-travel ticks: cycles `1..=n`.
pub fn spatial_rank(ticks: u64, n_states: usize) -> Option<u32> {
    (n_states > 0).then(|| (ticks % n_states as u64) as u32 + 1)
}

/// Applies a control-to-control callback. Returns `false` for chart
/// callbacks, which leave the controls alone.
pub fn apply_control_callback(id: CallbackId, controls: &mut ControlState, span: YearSpan) -> bool {
    match id {
        CallbackId::ChangeAuto => controls.interval_ms = interval_for(controls.auto),
        CallbackId::AdvanceSlider => {
            controls.year = advance_year(span, controls.year, controls.auto);
        }
        CallbackId::ToggleSpatialOptions => controls.spatial_travel_available = !controls.auto,
        CallbackId::ClearSpatialTravel => controls.spatial_travel = false,
        CallbackId::ResetSpatialTicks => controls.spatial_ticks = 0,
        CallbackId::ChangeSpatialInterval => {
            controls.spatial_interval_ms = interval_for(controls.spatial_travel);
        }
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{
        ACTIVE_INTERVAL_MS, INACTIVE_INTERVAL_MS, advance_year, apply_control_callback, spatial_rank,
    };
    use crate::controls::ControlState;
    use crate::graph::{CallbackId, DependencyGraph, Node};
    use foundation::{Year, YearSpan};
    use pretty_assertions::assert_eq;

    fn span() -> YearSpan {
        YearSpan::new(Year(1929), Year(2009)).unwrap()
    }

    fn run(controls: &mut ControlState, changed: Node) {
        let graph = DependencyGraph::dashboard().unwrap();
        for cb in graph.affected(&[changed]) {
            apply_control_callback(cb.id, controls, span());
        }
    }

    #[test]
    fn slider_wraps_and_freezes_when_off() {
        assert_eq!(advance_year(span(), Year(1950), true), Year(1951));
        assert_eq!(advance_year(span(), Year(2009), true), Year(1929));
        assert_eq!(advance_year(span(), Year(1950), false), Year(1950));
    }

    #[test]
    fn spatial_rank_cycles_from_one() {
        assert_eq!(spatial_rank(0, 48), Some(1));
        assert_eq!(spatial_rank(47, 48), Some(48));
        assert_eq!(spatial_rank(48, 48), Some(1));
        assert_eq!(spatial_rank(5, 0), None);
    }

    #[test]
    fn toggling_time_travel_on_and_off() {
        let mut c = ControlState::initial(span());
        c.spatial_travel = true;
        c.spatial_ticks = 7;
        c.spatial_interval_ms = ACTIVE_INTERVAL_MS;

        c.auto = true;
        run(&mut c, Node::AutoCheck);
        assert_eq!(c.interval_ms, ACTIVE_INTERVAL_MS);
        assert!(!c.spatial_travel_available);
        assert!(!c.spatial_travel);
        assert_eq!(c.spatial_ticks, 0);
        assert_eq!(c.spatial_interval_ms, INACTIVE_INTERVAL_MS);

        c.auto = false;
        run(&mut c, Node::AutoCheck);
        assert_eq!(c.interval_ms, INACTIVE_INTERVAL_MS);
        assert!(c.spatial_travel_available);

        // A tick with time travelling off leaves the slider where it is.
        c.year = Year(1970);
        c.interval_ticks += 1;
        run(&mut c, Node::IntervalTicks);
        assert_eq!(c.year, Year(1970));
    }

    #[test]
    fn tick_advances_and_resets_spatial_ticks() {
        let mut c = ControlState::initial(span());
        c.auto = true;
        c.spatial_ticks = 3;
        run(&mut c, Node::IntervalTicks);
        assert_eq!(c.year, Year(1930));
        assert_eq!(c.spatial_ticks, 0);
    }

    #[test]
    fn chart_callbacks_are_not_control_callbacks() {
        let mut c = ControlState::initial(span());
        let before = c.clone();
        assert!(!apply_control_callback(CallbackId::Rose, &mut c, span()));
        assert_eq!(c, before);
    }
}
