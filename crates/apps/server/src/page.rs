//! The single dashboard page. Widgets are built from `/api/layout`; every
//! change posts to `/api/dispatch` and applies the returned updates.

pub const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>US state income: space-time ESDA</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body { font-family: Arial, sans-serif; margin: 16px; background: #fafafa; }
  h1 { font-size: 22px; }
  .row { display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-start; }
  .chart { flex: 1 1 560px; min-height: 460px; background: white; }
  .wide { flex: 1 1 100%; }
  .controls { display: flex; flex-wrap: wrap; gap: 18px; margin: 12px 0; }
  .controls label { font-size: 13px; }
  output { font-weight: bold; margin-left: 4px; }
</style>
</head>
<body>
<h1>Income convergence of the contiguous US states</h1>

<div class="controls">
  <label>Variable
    <select id="type_data_selector">
      <option value="pcr">PCR</option>
      <option value="raw">Raw</option>
    </select>
  </label>
  <label>Year <input type="range" id="years-slider" list="years-slider-marks"><datalist id="years-slider-marks"></datalist><output id="years-slider-out"></output></label>
  <label><input type="checkbox" id="auto-check"> Time Travelling</label>
  <label id="spatial_travel-wrap"><input type="checkbox" id="spatial_travel-check"><span id="spatial_travel-label"></span></label>
</div>

<div class="row">
  <div class="chart" id="choropleth-graph"></div>
  <div class="chart" id="scatter-graph"></div>
</div>
<div class="row">
  <div class="chart" id="timeseries-graph"></div>
  <div class="chart" id="boxplot-graph"></div>
</div>
<div class="row">
  <div class="chart" id="timepath-graph"></div>
  <div>
    <div class="controls">
      <label>Initial year <select id="initial_years_dropdown"></select></label>
      <label>Final year <select id="final_years_dropdown"></select></label>
    </div>
    <div class="chart" id="density-graph"></div>
  </div>
</div>

<div class="controls">
  <label>Rank <select id="rankpath_dropdown"></select></label>
  <label>Year <input type="range" id="years-slider-rank-path"><output id="years-slider-rank-path-out"></output></label>
</div>
<div class="row"><div class="chart wide" id="rank-path-graph"></div></div>

<div class="controls">
  <label>Classes <select id="markov-pooled-classes-dropdown"></select></label>
  <label>Spatial lag classes <select id="markov-pooled-spatial-dropdown"></select></label>
</div>
<div class="row">
  <div class="chart" id="markov-pooled-graph"></div>
  <div class="chart" id="markov-spatial-graph"></div>
</div>

<div class="controls">
  <label>LIMA years <select id="rank-range-from"></select> to <select id="rank-range-to"></select></label>
</div>
<div class="row"><div class="chart wide" id="lima-neighborhood-graph"></div></div>

<div class="controls">
  <label>Rose years <select id="rose-range-from"></select> to <select id="rose-range-to"></select></label>
  <label>Sectors <input type="range" id="rose-k"><output id="rose-k-out"></output></label>
</div>
<div class="row"><div class="chart wide" id="rose-graph"></div></div>

<script>
"use strict";

let layout = null;
let controls = null;
const interactions = { moran_hover: null, map_click: null, map_selection: null, scatter_selection: null };
let timer = null, timerMs = null;
let spatialTimer = null, spatialTimerMs = null;
let inFlight = Promise.resolve();

const $ = (id) => document.getElementById(id);

function fillSelect(id, items) {
  const el = $(id);
  el.innerHTML = "";
  for (const item of items) {
    const opt = document.createElement("option");
    opt.value = typeof item === "object" ? item.value : item;
    opt.textContent = typeof item === "object" ? item.label : item;
    el.appendChild(opt);
  }
}

function setRange(id, min, max, step) {
  const el = $(id);
  el.min = min; el.max = max; el.step = step || 1;
}

// Control widget <-> controls field, keyed by the node it feeds.
const widgets = {
  "type_data_selector.value": { id: "type_data_selector", get: (el) => el.value, set: (el, v) => { el.value = v; }, field: "variable" },
  "years-slider.value": { id: "years-slider", get: (el) => +el.value, set: (el, v) => { el.value = v; $("years-slider-out").textContent = v; }, field: "year" },
  "auto-check.value": { id: "auto-check", get: (el) => el.checked, set: (el, v) => { el.checked = v; }, field: "auto" },
  "spatial_travel-check.value": { id: "spatial_travel-check", get: (el) => el.checked, set: (el, v) => { el.checked = v; }, field: "spatial_travel" },
  "initial_years_dropdown.value": { id: "initial_years_dropdown", get: (el) => +el.value, set: (el, v) => { el.value = v; }, field: "density_initial" },
  "final_years_dropdown.value": { id: "final_years_dropdown", get: (el) => +el.value, set: (el, v) => { el.value = v; }, field: "density_final" },
  "rankpath_dropdown.value": { id: "rankpath_dropdown", get: (el) => +el.value, set: (el, v) => { el.value = v; }, field: "rank_path_rank" },
  "years-slider-rank-path.value": { id: "years-slider-rank-path", get: (el) => +el.value, set: (el, v) => { el.value = v; $("years-slider-rank-path-out").textContent = v; }, field: "rank_path_year" },
  "markov-pooled-classes-dropdown.value": { id: "markov-pooled-classes-dropdown", get: (el) => +el.value, set: (el, v) => { el.value = v; }, field: "markov_classes" },
  "markov-pooled-spatial-dropdown.value": { id: "markov-pooled-spatial-dropdown", get: (el) => +el.value, set: (el, v) => { el.value = v; }, field: "markov_lag_classes" },
  "rose-k.value": { id: "rose-k", get: (el) => +el.value, set: (el, v) => { el.value = v; $("rose-k-out").textContent = v; }, field: "rose_k" },
};

const pairs = {
  "rank-range-slider.value": { from: "rank-range-from", to: "rank-range-to", field: "lima_years" },
  "rose-range-slider.value": { from: "rose-range-from", to: "rose-range-to", field: "rose_years" },
};

function syncWidgets() {
  for (const w of Object.values(widgets)) w.set($(w.id), controls[w.field]);
  for (const p of Object.values(pairs)) {
    $(p.from).value = controls[p.field][0];
    $(p.to).value = controls[p.field][1];
  }
  $("spatial_travel-wrap").style.display = controls.spatial_travel_available ? "" : "none";
  scheduleTimers();
}

function scheduleTimers() {
  if (timerMs !== controls.interval_ms) {
    if (timer) clearInterval(timer);
    timerMs = controls.interval_ms;
    timer = setInterval(() => {
      controls.interval_ticks += 1;
      dispatch(["interval-event.n_intervals"]);
    }, timerMs);
  }
  if (spatialTimerMs !== controls.spatial_interval_ms) {
    if (spatialTimer) clearInterval(spatialTimer);
    spatialTimerMs = controls.spatial_interval_ms;
    spatialTimer = setInterval(() => {
      controls.spatial_ticks += 1;
      dispatch(["spatial_interval-event.n_intervals"]);
    }, spatialTimerMs);
  }
}

function applyUpdates(resp) {
  controls = resp.controls;
  for (const update of resp.updates) {
    const [component, property] = update.output.split(".");
    if (property === "figure") {
      Plotly.react(component, update.value.data, update.value.layout);
    }
  }
  syncWidgets();
}

function dispatch(changed) {
  const body = JSON.stringify({ controls, interactions, changed });
  inFlight = inFlight
    .then(() => fetch("/api/dispatch", { method: "POST", headers: { "Content-Type": "application/json" }, body }))
    .then((r) => r.ok ? r.json() : r.json().then((e) => Promise.reject(e.error)))
    .then(applyUpdates)
    .catch((err) => console.error("dispatch failed:", err));
  return inFlight;
}

function pointIndices(event, curve) {
  if (!event || !event.points) return null;
  return event.points
    .filter((p) => curve === undefined || p.curveNumber === curve)
    .map((p) => p.pointIndex !== undefined ? p.pointIndex : p.pointNumber);
}

function bindSelection(chart, field, curve) {
  const node = chart + ".selectedData";
  const clear = () => {
    interactions[field] = null;
    dispatch([node]);
  };
  $(chart).on("plotly_selected", (ev) => {
    if (!ev) return clear();
    interactions[field] = pointIndices(ev, curve);
    dispatch([node]);
  });
  $(chart).on("plotly_deselect", clear);
}

function bindCharts() {
  $("timeseries-graph").on("plotly_hover", (ev) => {
    interactions.moran_hover = ev.points[0].x;
    dispatch(["timeseries-graph.hoverData"]);
  });
  // Map traces share one location order, so any curve's index names the state.
  $("choropleth-graph").on("plotly_click", (ev) => {
    const points = pointIndices(ev);
    if (!points || points.length === 0) return;
    interactions.map_click = points[0];
    dispatch(["choropleth-graph.clickData"]);
  });
  bindSelection("choropleth-graph", "map_selection", undefined);
  bindSelection("scatter-graph", "scatter_selection", 0);
}

function bindControls() {
  for (const [node, w] of Object.entries(widgets)) {
    $(w.id).addEventListener("change", (ev) => {
      controls[w.field] = w.get(ev.target);
      dispatch([node]);
    });
  }
  for (const [node, p] of Object.entries(pairs)) {
    const onChange = () => {
      controls[p.field] = [+$(p.from).value, +$(p.to).value];
      dispatch([node]);
    };
    $(p.from).addEventListener("change", onChange);
    $(p.to).addEventListener("change", onChange);
  }
}

async function main() {
  layout = await (await fetch("/api/layout")).json();
  controls = layout.initial;

  setRange("years-slider", layout.first_year, layout.last_year);
  setRange("years-slider-rank-path", layout.first_year, layout.last_year);
  setRange("rose-k", layout.rose_k[0], layout.rose_k[layout.rose_k.length - 1]);
  for (const id of ["initial_years_dropdown", "final_years_dropdown", "rank-range-from", "rank-range-to", "rose-range-from", "rose-range-to"]) {
    fillSelect(id, layout.years);
  }
  fillSelect("years-slider-marks", layout.slider_marks);
  fillSelect("rankpath_dropdown", layout.ranks);
  fillSelect("markov-pooled-classes-dropdown", layout.markov_classes);
  fillSelect("markov-pooled-spatial-dropdown", layout.lag_classes);
  $("spatial_travel-label").textContent = layout.spatial_travel_label;

  syncWidgets();
  bindControls();
  await dispatch([]);
  bindCharts();
}

main();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::INDEX_HTML;

    #[test]
    fn cleared_selections_are_sent_as_null() {
        assert!(INDEX_HTML.contains(r#"on("plotly_deselect", clear)"#));
        assert!(INDEX_HTML.contains("if (!ev) return clear();"));
        assert!(INDEX_HTML.contains(r#"bindSelection("choropleth-graph", "map_selection""#));
        assert!(INDEX_HTML.contains(r#"bindSelection("scatter-graph", "scatter_selection""#));
    }

    #[test]
    fn map_clicks_accept_any_trace() {
        assert!(INDEX_HTML.contains("const points = pointIndices(ev);"));
        assert!(INDEX_HTML.contains("if (!points || points.length === 0) return;"));
    }

    #[test]
    fn year_slider_lists_its_marks() {
        assert!(INDEX_HTML.contains(r#"list="years-slider-marks""#));
        assert!(INDEX_HTML.contains(r#"fillSelect("years-slider-marks", layout.slider_marks)"#));
    }

    #[test]
    fn page_has_a_container_per_chart() {
        for id in [
            "choropleth-graph",
            "scatter-graph",
            "timeseries-graph",
            "boxplot-graph",
            "timepath-graph",
            "density-graph",
            "rank-path-graph",
            "markov-pooled-graph",
            "markov-spatial-graph",
            "lima-neighborhood-graph",
            "rose-graph",
        ] {
            assert!(
                INDEX_HTML.contains(&format!(r#"<div class="chart" id="{id}">"#))
                    || INDEX_HTML.contains(&format!(r#"<div class="chart wide" id="{id}">"#)),
                "{id}"
            );
        }
    }
}
