//! One round trip of the page: apply the control callbacks reachable from the
//! changed input, then rebuild every reachable chart.

use charts::ChartOptions;
use panel::Panel;
use runtime::{
    apply_control_callback, CallbackId, ControlState, DependencyGraph, Interactions, Node,
    Resolved,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchRequest {
    /// Missing on the first render.
    #[serde(default)]
    pub controls: Option<ControlState>,
    #[serde(default)]
    pub interactions: Interactions,
    /// Empty on the first render, which draws every chart.
    #[serde(default)]
    pub changed: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub output: Node,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResponse {
    pub controls: ControlState,
    /// Recomputed outputs in dependency order.
    pub updates: Vec<Update>,
}

pub fn dispatch(
    panel: &Panel,
    graph: &DependencyGraph,
    options: &ChartOptions,
    req: DispatchRequest,
) -> DispatchResponse {
    let span = panel.span();
    let mut controls = req
        .controls
        .unwrap_or_else(|| ControlState::initial(span))
        .sanitized(span, panel.n_states());

    let initial_render = req.changed.is_empty();
    let callbacks = if initial_render {
        graph.all()
    } else {
        graph.affected(&req.changed)
    };

    // Charts never write controls, so every control callback can run first.
    let mut control_ids: Vec<CallbackId> = Vec::new();
    if !initial_render {
        for cb in &callbacks {
            if apply_control_callback(cb.id, &mut controls, span) {
                control_ids.push(cb.id);
            }
        }
    }
    let inputs = Resolved::new(panel, &controls, &req.interactions);

    let mut updates = Vec::with_capacity(callbacks.len());
    for cb in &callbacks {
        if control_ids.contains(&cb.id) {
            updates.extend(cb.outputs.iter().filter_map(|&output| {
                controls
                    .property(output)
                    .map(|value| Update { output, value })
            }));
        } else if let Some(figure) = charts::build(cb.id, panel, &inputs, options) {
            for &output in &cb.outputs {
                // Figures serialize infallibly; non-finite numbers become null.
                let value = serde_json::to_value(&figure).unwrap_or(Value::Null);
                updates.push(Update { output, value });
            }
        }
    }

    debug!(
        changed = ?req.changed,
        outputs = ?updates.iter().map(|u| u.output).collect::<Vec<_>>(),
        "dispatched"
    );
    DispatchResponse { controls, updates }
}
