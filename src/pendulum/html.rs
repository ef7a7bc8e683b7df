//! Self-contained HTML5 player. The frame geometry is embedded as JSON and a
//! small script draws each frame on a canvas, advancing one sample per tick.

use serde::Serialize;
use std::path::Path;

use super::{
    error::SimulationError,
    geometry::FrameGeometry,
    params::{AnimationStyle, PlaybackParams},
};

const DATA_ELEMENT_OPEN: &str = r#"<script id="pendulum-data" type="application/json">"#;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>__PAGE_TITLE__</title>
<style>
  body { font-family: sans-serif; margin: 1em; }
  #controls { margin-top: 0.5em; }
  #controls button { margin-right: 0.5em; }
</style>
</head>
<body>
__HEADING__
<canvas id="pendulum-canvas" width="__SIZE__" height="__SIZE__"></canvas>
<div id="controls">
  <button id="play-pause">Pause</button>
  <button id="restart">Restart</button>
  <span id="clock"></span>
</div>
__DATA_ELEMENT__
<script>
(function () {
  var data = JSON.parse(document.getElementById("pendulum-data").textContent);
  var style = data.style;
  var canvas = document.getElementById("pendulum-canvas");
  var ctx = canvas.getContext("2d");
  var size = style.figure_size_px;
  var limit = style.axis_limit;

  function rgb(c) { return "rgb(" + c[0] + "," + c[1] + "," + c[2] + ")"; }
  function px(x) { return (x + limit) / (2 * limit) * (size - 1); }
  function py(y) { return (limit - y) / (2 * limit) * (size - 1); }

  function drawGrid() {
    ctx.save();
    ctx.globalAlpha = style.grid_alpha;
    ctx.strokeStyle = rgb(style.grid_color);
    ctx.lineWidth = 1;
    ctx.setLineDash([6, 4]);
    for (var t = Math.ceil(-limit); t <= Math.floor(limit); t++) {
      ctx.beginPath();
      ctx.moveTo(px(t), py(-limit)); ctx.lineTo(px(t), py(limit));
      ctx.moveTo(px(-limit), py(t)); ctx.lineTo(px(limit), py(t));
      ctx.stroke();
    }
    ctx.restore();
  }

  function drawFrame(i) {
    ctx.fillStyle = rgb(style.background_color);
    ctx.fillRect(0, 0, size, size);
    drawGrid();

    var start = Math.max(0, i - data.trail_length);
    var segments = i - start - 1;
    ctx.save();
    ctx.strokeStyle = rgb(style.trail_color);
    ctx.lineWidth = style.trail_width_px;
    for (var k = 0; k < segments; k++) {
      var a = data.bob2[start + k], b = data.bob2[start + k + 1];
      ctx.globalAlpha = style.trail_alpha * (k + 1) / segments;
      ctx.beginPath();
      ctx.moveTo(px(a[0]), py(a[1]));
      ctx.lineTo(px(b[0]), py(b[1]));
      ctx.stroke();
    }
    ctx.restore();

    var joints = [[0, 0], data.bob1[i], data.bob2[i]];
    ctx.strokeStyle = rgb(style.rod_color);
    ctx.fillStyle = rgb(style.rod_color);
    ctx.lineWidth = style.rod_width_px;
    ctx.beginPath();
    ctx.moveTo(px(joints[0][0]), py(joints[0][1]));
    ctx.lineTo(px(joints[1][0]), py(joints[1][1]));
    ctx.lineTo(px(joints[2][0]), py(joints[2][1]));
    ctx.stroke();
    joints.forEach(function (p) {
      ctx.beginPath();
      ctx.arc(px(p[0]), py(p[1]), style.bob_radius_px, 0, 2 * Math.PI);
      ctx.fill();
    });

    document.getElementById("clock").textContent = "t = " + data.times[i].toFixed(2) + " s";
  }

  var index = 0;
  var timer = null;
  function tick() {
    drawFrame(index);
    index = (index + 1) % data.times.length;
  }
  function play() {
    if (timer === null) { timer = setInterval(tick, data.frame_interval_ms); }
    document.getElementById("play-pause").textContent = "Pause";
  }
  function pause() {
    if (timer !== null) { clearInterval(timer); timer = null; }
    document.getElementById("play-pause").textContent = "Play";
  }
  document.getElementById("play-pause").onclick = function () {
    if (timer === null) { play(); } else { pause(); }
  };
  document.getElementById("restart").onclick = function () {
    index = 0;
    drawFrame(index);
  };
  drawFrame(0);
  play();
})();
</script>
</body>
</html>
"#;

#[derive(Serialize)]
struct PlayerData<'a> {
    times: &'a [f64],
    bob1: Vec<[f64; 2]>,
    bob2: Vec<[f64; 2]>,
    trail_length: usize,
    frame_interval_ms: u32,
    style: &'a AnimationStyle,
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_inline_html(
    geometry: &FrameGeometry,
    playback: &PlaybackParams,
    style: &AnimationStyle,
) -> Result<String, SimulationError> {
    let data = PlayerData {
        times: geometry.times(),
        bob1: geometry.frames().iter().map(|f| [f.bob1[0], f.bob1[1]]).collect(),
        bob2: geometry.frames().iter().map(|f| [f.bob2[0], f.bob2[1]]).collect(),
        trail_length: playback.trail_length,
        frame_interval_ms: playback.frame_interval_ms,
        style,
    };
    // `</` would end the script element early.
    let json = serde_json::to_string(&data)
        .map_err(std::io::Error::from)?
        .replace("</", "<\\/");

    let (page_title, heading) = match &style.title {
        Some(title) => {
            let title = escape_html(title);
            (title.clone(), format!("<h3>{}</h3>", title))
        }
        None => ("Double Pendulum".to_owned(), String::new()),
    };

    Ok(PAGE_TEMPLATE
        .replace("__PAGE_TITLE__", &page_title)
        .replace("__HEADING__", &heading)
        .replace("__SIZE__", &style.figure_size_px.to_string())
        .replace(
            "__DATA_ELEMENT__",
            &format!("{}{}</script>", DATA_ELEMENT_OPEN, json),
        ))
}

pub fn export_inline_html(
    geometry: &FrameGeometry,
    playback: &PlaybackParams,
    style: &AnimationStyle,
    output: &Path,
) -> Result<(), SimulationError> {
    let page = render_inline_html(geometry, playback, style)?;
    std::fs::write(output, page)?;
    log::info!("Wrote HTML player to: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pendulum::params::DoublePendulumParams;
    use approx::assert_relative_eq;

    fn embedded_data(page: &str) -> serde_json::Value {
        let start = page.find(DATA_ELEMENT_OPEN).unwrap() + DATA_ELEMENT_OPEN.len();
        let end = start + page[start..].find("</script>").unwrap();
        serde_json::from_str(&page[start..end]).unwrap()
    }

    #[test]
    fn test_inline_page_embeds_every_frame() {
        let params = DoublePendulumParams::inline_preset();
        let geometry = params.simulation.run().unwrap().geometry;
        let page = render_inline_html(&geometry, &params.playback, &params.style).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<canvas id="pendulum-canvas" width="500" height="500">"#));
        assert!(!page.contains("<h3>"));
        assert!(!page.contains("__"));

        let data = embedded_data(&page);
        assert_eq!(data["times"].as_array().unwrap().len(), 500);
        assert_eq!(data["bob2"].as_array().unwrap().len(), 500);
        assert_eq!(data["trail_length"], 50);
        assert_eq!(data["frame_interval_ms"], 30);
        assert_relative_eq!(data["bob2"][0][0].as_f64().unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(data["bob2"][0][1].as_f64().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_title_is_escaped() {
        let mut params = DoublePendulumParams::inline_preset();
        params.simulation.sample_count = 3;
        params.style.title = Some("Chaos </script> & <b>".to_owned());
        let geometry = params.simulation.run().unwrap().geometry;
        let page = render_inline_html(&geometry, &params.playback, &params.style).unwrap();

        assert!(page.contains("<h3>Chaos &lt;/script&gt; &amp; &lt;b&gt;</h3>"));
        // The embedded copy of the title must not terminate the data element.
        assert_eq!(
            embedded_data(&page)["style"]["title"],
            "Chaos </script> & <b>"
        );
    }
}
