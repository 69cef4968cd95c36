//! Where a given rank has lived over time: the centroids of the states that
//! held it, joined year by year on top of the state outlines.

use panel::Panel;
use runtime::Resolved;
use serde_json::json;

use crate::error::{ChartError, ChartResult};
use crate::figure::Figure;
use crate::outlines::{centroid_trace, map_layout, outline_of, outline_trace};
use crate::symbology::{OTHER, OutlineStyle};

const HIGHLIGHT_SIZE: u32 = 14;

pub fn rank_path(panel: &Panel, inputs: &Resolved) -> ChartResult<Figure> {
    let rank = inputs.rank_path_rank;
    let highlighted_year = inputs.rank_path_year;

    let mut data = Vec::with_capacity(2 * panel.n_states() + 2);
    let style = OutlineStyle::default();
    for state in panel.states() {
        let outline = outline_of(state)?;
        data.push(outline_trace(&outline, &style, None));
        data.push(centroid_trace(&state.name, &outline));
    }

    let mut xs = Vec::with_capacity(panel.span().len());
    let mut ys = Vec::with_capacity(panel.span().len());
    let mut names = Vec::with_capacity(panel.span().len());
    let mut sizes = Vec::with_capacity(panel.span().len());
    let mut colors = Vec::with_capacity(panel.span().len());
    let mut highlighted = None;
    for year in panel.span().iter() {
        let holder = panel
            .holder_of_rank(year, rank)
            .ok_or(ChartError::NoRankHolder { rank, year })?;
        let state = &panel.states()[holder];
        let centroid = outline_of(state)?.centroid;
        xs.push(centroid.x);
        ys.push(centroid.y);
        names.push(state.name.as_str());
        if year == highlighted_year {
            highlighted = Some(state.name.as_str());
            sizes.push(HIGHLIGHT_SIZE);
            colors.push(OTHER);
        } else {
            sizes.push(0);
            colors.push("red");
        }
    }
    let highlighted = highlighted.ok_or(ChartError::MissingYear(highlighted_year))?;

    data.push(json!({
        "x": xs,
        "y": ys,
        "mode": "lines",
        "name": "Path",
        "opacity": 1,
        "hoverinfo": "none",
        "line": { "color": "red", "width": 4 },
        "showlegend": false,
    }));
    data.push(json!({
        "x": xs,
        "y": ys,
        "mode": "markers",
        "hoverinfo": "text",
        "marker": { "size": sizes, "color": colors, "opacity": 1 },
        "name": "",
        "text": names,
        "showlegend": false,
    }));

    let title = format!(
        "<b>RankPath for the Rank {rank} and highlighted {highlighted_year}: {highlighted}</b>"
    );
    Ok(Figure::new(data, map_layout(title)))
}

#[cfg(test)]
mod tests {
    use super::rank_path;
    use foundation::Year;
    use panel::fixtures;
    use pretty_assertions::assert_eq;
    use runtime::{ControlState, Interactions, Resolved};
    use serde_json::json;

    #[test]
    fn path_visits_each_years_rank_holder() {
        let panel = fixtures::sample_panel().unwrap();
        let mut controls = ControlState::initial(panel.span());
        controls.rank_path_rank = 5;
        controls.rank_path_year = Year(1935);
        let r = Resolved::new(&panel, &controls, &Interactions::default());
        let fig = rank_path(&panel, &r).unwrap();

        // Outline and centroid per state, then the path and its markers.
        assert_eq!(fig.data.len(), 2 * 48 + 2);
        let markers = &fig.data[2 * 48 + 1];
        let names = markers["text"].as_array().unwrap();
        assert_eq!(names.len(), panel.span().len());
        for (year, name) in panel.span().iter().zip(names) {
            let holder = panel.holder_of_rank(year, 5).unwrap();
            assert_eq!(name, &json!(panel.states()[holder].name));
        }

        let sizes = markers["marker"]["size"].as_array().unwrap();
        assert_eq!(sizes.iter().filter(|s| **s == json!(14)).count(), 1);
        assert_eq!(sizes[6], json!(14));

        let holder = panel.holder_of_rank(Year(1935), 5).unwrap();
        assert_eq!(
            fig.title(),
            Some(
                format!(
                    "<b>RankPath for the Rank 5 and highlighted 1935: {}</b>",
                    panel.states()[holder].name
                )
                .as_str()
            )
        );
    }
}
